mod common;

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use nowplaylist::{
    error::{ApiError, PipelineError, ScrapeError},
    management::SongLog,
    pipeline::{CycleReport, CycleState, PollingPipeline, QueryStyle, SongOutcome},
    scrape::NowPlayingSource,
    spotify::track_search_params,
    types::Song,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::{sync::Notify, time::Instant};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

use common::{client_for, mount_token, playlist_page, search_result};

const PLAYLIST: &str = "pl";

struct FixedSongs(Vec<Song>);

#[async_trait]
impl NowPlayingSource for FixedSongs {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        Ok(self.0.clone())
    }
}

fn pipeline(server: &MockServer, dir: &TempDir, songs: Vec<Song>) -> PollingPipeline<FixedSongs> {
    PollingPipeline::new(
        client_for(server, 0, Duration::from_millis(1)),
        FixedSongs(songs),
        PLAYLIST,
        SongLog::new(dir.path().join("songs.txt")),
        SongLog::new(dir.path().join("mystery-songs.txt")),
    )
}

async fn mount_playlist(server: &MockServer, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/playlists/{PLAYLIST}/tracks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(ids)))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, query: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("type", "track"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(ids)))
        .mount(server)
        .await;
}

async fn mount_append(server: &MockServer, ids: &[&str], times: u64) {
    let uris: Vec<String> = ids.iter().map(|id| format!("spotify:track:{id}")).collect();
    Mock::given(method("POST"))
        .and(path(format!("/v1/playlists/{PLAYLIST}/tracks")))
        .and(body_json(json!({ "uris": uris })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "snap" })))
        .expect(times)
        .mount(server)
        .await;
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_new_song_is_appended_and_recorded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Björk\" Undertow", &["t1", "t2"]).await;
    mount_append(&server, &["t1"], 1).await;

    let mut pipeline = pipeline(&server, &dir, vec![Song::new("Bjцrk", "Undertow (Remix)")]);
    let report = pipeline.run_cycle().await.unwrap();

    assert_eq!(
        report,
        CycleReport {
            scraped: 1,
            appended: 1,
            already_seen: 0,
            mysteries: 0,
            skipped: 0,
        }
    );
    assert!(pipeline.seen().contains("t1"));
    assert!(!pipeline.seen().contains("t2"));
    assert_eq!(pipeline.state(), CycleState::Idle);

    let records = read_lines(&dir.path().join("songs.txt"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["artist"], "Björk");
    assert_eq!(records[0]["title"], "Undertow");
    assert_eq!(records[0]["track_id"], "t1");
    assert_eq!(records[0]["track_uri"], "spotify:track:t1");
    assert_eq!(
        records[0]["params"],
        track_search_params("artist:\"Björk\" Undertow")
    );

    assert!(!dir.path().join("mystery-songs.txt").exists());
}

#[tokio::test]
async fn test_tracks_already_in_playlist_are_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &["A", "B"]).await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["A"]).await;
    mount_search(&server, "artist:\"Air\" Sexy Boy", &["C"]).await;
    mount_append(&server, &["C"], 1).await;

    let songs = vec![Song::new("Moby", "Porcelain"), Song::new("Air", "Sexy Boy")];
    let mut pipeline = pipeline(&server, &dir, songs);
    let report = pipeline.run_cycle().await.unwrap();

    assert_eq!(report.appended, 1);
    assert_eq!(report.already_seen, 1);
    assert_eq!(pipeline.seen().len(), 3);

    let records = read_lines(&dir.path().join("songs.txt"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["track_id"], "C");
}

#[tokio::test]
async fn test_song_reported_twice_is_appended_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["m1"]).await;
    mount_append(&server, &["m1"], 1).await;

    let songs = vec![Song::new("Moby", "Porcelain"), Song::new("Moby", "Porcelain")];
    let report = pipeline(&server, &dir, songs).run_cycle().await.unwrap();

    assert_eq!(report.appended, 1);
    assert_eq!(report.already_seen, 1);
}

#[tokio::test]
async fn test_unknown_song_goes_to_mystery_log() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Nobody\" Nothing", &[]).await;
    mount_append(&server, &[], 0).await;

    let mut pipeline = pipeline(&server, &dir, vec![Song::new("Nobody", "Nothing")]);
    let report = pipeline.run_cycle().await.unwrap();

    assert_eq!(report.mysteries, 1);
    assert!(pipeline.seen().is_empty());

    let records = read_lines(&dir.path().join("mystery-songs.txt"));
    assert_eq!(
        records,
        vec![json!({
            "artist": "Nobody",
            "title": "Nothing",
            "params": track_search_params("artist:\"Nobody\" Nothing"),
        })]
    );
    assert!(!dir.path().join("songs.txt").exists());
}

#[tokio::test]
async fn test_failed_append_is_rolled_back_and_retried_next_cycle() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 2).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["m1"]).await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/playlists/{PLAYLIST}/tracks")))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_append(&server, &["m1"], 1).await;

    let mut pipeline = pipeline(&server, &dir, vec![Song::new("Moby", "Porcelain")]);

    let first = pipeline.run_cycle().await;
    assert!(matches!(
        first,
        Err(PipelineError::Api(ApiError::NotOk { status: 500, .. }))
    ));
    assert!(!pipeline.seen().contains("m1"));
    assert!(!dir.path().join("songs.txt").exists());
    assert_eq!(pipeline.state(), CycleState::Idle);

    let second = pipeline.run_cycle().await.unwrap();
    assert_eq!(second.appended, 1);
    assert!(pipeline.seen().contains("m1"));
    assert_eq!(read_lines(&dir.path().join("songs.txt")).len(), 1);
}

#[tokio::test]
async fn test_strict_queries_quote_the_title() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Air\" track:\"Sexy Boy\"", &["a1"]).await;
    mount_append(&server, &["a1"], 1).await;

    let mut pipeline = pipeline(&server, &dir, vec![Song::new("Air", "Sexy Boy")])
        .with_query_style(QueryStyle::Strict);

    assert_eq!(pipeline.run_cycle().await.unwrap().appended, 1);
}

#[tokio::test]
async fn test_run_loop_stops_on_shutdown() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["m1"]).await;
    mount_append(&server, &["m1"], 1).await;

    // The first tick fires right away; the next one is far beyond shutdown
    pipeline(&server, &dir, vec![Song::new("Moby", "Porcelain")])
        .run(
            Duration::from_secs(3600),
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await;

    assert_eq!(read_lines(&dir.path().join("songs.txt")).len(), 1);
}

#[tokio::test]
async fn test_candidate_without_id_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_playlist(&server, &[]).await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {
                "items": [{ "id": null, "name": "Porcelain", "uri": "spotify:local:moby:porcelain" }],
                "next": null,
                "total": 1
            }
        })))
        .mount(&server)
        .await;
    mount_append(&server, &[], 0).await;

    let mut pipeline = pipeline(&server, &dir, vec![Song::new("Moby", "Porcelain")]);
    let report = pipeline.run_cycle().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.already_seen, 0);
    assert_eq!(report.appended, 0);
    assert!(pipeline.seen().is_empty());
    assert!(!dir.path().join("songs.txt").exists());
    assert!(!dir.path().join("mystery-songs.txt").exists());
}

#[tokio::test]
async fn test_process_song_reports_outcome() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 1).await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["m1"]).await;
    mount_append(&server, &["m1"], 1).await;

    let mut pipeline = pipeline(&server, &dir, Vec::new());
    let outcome = pipeline
        .process_song(&Song::new("Moby", "Porcelain"))
        .await
        .unwrap();

    match outcome {
        SongOutcome::Appended(track) => assert_eq!(track.uri, "spotify:track:m1"),
        other => panic!("expected an append, got {other:?}"),
    }
}

/// Answers after `work` and records when each call started and finished.
/// Wakes `done` once it has answered `stop_after` times.
struct SlowSource {
    work: Duration,
    calls: Arc<Mutex<Vec<(Instant, Instant)>>>,
    stop_after: usize,
    done: Arc<Notify>,
}

#[async_trait]
impl NowPlayingSource for SlowSource {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        let started = Instant::now();
        tokio::time::sleep(self.work).await;

        let answered = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((started, Instant::now()));
            calls.len()
        };
        if answered == self.stop_after {
            self.done.notify_one();
        }

        Ok(vec![Song::new("Moby", "Porcelain")])
    }
}

#[tokio::test]
async fn test_run_loop_survives_failed_cycle_and_never_overlaps() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server, "tok", 3).await;

    // First listing fails slowly, every later one succeeds
    let failing_listing = Duration::from_millis(300);
    Mock::given(method("GET"))
        .and(path(format!("/v1/playlists/{PLAYLIST}/tracks")))
        .respond_with(ResponseTemplate::new(500).set_delay(failing_listing))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/playlists/{PLAYLIST}/tracks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&[])))
        .expect(2)
        .mount(&server)
        .await;
    mount_search(&server, "artist:\"Moby\" Porcelain", &["m1"]).await;
    mount_append(&server, &["m1"], 2).await;

    let calls = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new(Notify::new());
    let source = SlowSource {
        // Longer than the interval, so every successful cycle overruns
        work: Duration::from_millis(150),
        calls: Arc::clone(&calls),
        stop_after: 2,
        done: Arc::clone(&done),
    };
    let pipeline = PollingPipeline::new(
        client_for(&server, 0, Duration::from_millis(1)),
        source,
        PLAYLIST,
        SongLog::new(dir.path().join("songs.txt")),
        SongLog::new(dir.path().join("mystery-songs.txt")),
    );

    let started = Instant::now();
    let shutdown = async move { done.notified().await };
    tokio::time::timeout(
        Duration::from_secs(10),
        pipeline.run(Duration::from_millis(50), shutdown),
    )
    .await
    .expect("polling loop did not stop");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);

    // The second cycle only began once the failed first one had returned
    assert!(calls[0].0 - started >= failing_listing);

    // The overrunning cycle delayed the next one instead of overlapping it
    assert!(calls[1].0 >= calls[0].1);

    // Both successful cycles appended and recorded
    assert_eq!(read_lines(&dir.path().join("songs.txt")).len(), 2);
}

#[tokio::test]
async fn test_add_tracks_sends_uris() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    mount_append(&server, &["a", "b"], 1).await;

    let client = client_for(&server, 0, Duration::from_millis(1));
    let uris = vec!["spotify:track:a".to_string(), "spotify:track:b".to_string()];
    let response = client.add_tracks(PLAYLIST, &uris).await.unwrap();

    assert_eq!(response.snapshot_id, "snap");
}
