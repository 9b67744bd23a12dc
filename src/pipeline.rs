//! The polling pipeline.
//!
//! One cycle walks through
//! `Idle → Scraping → Normalizing → Searching → Deciding → Appending → Recording → Idle`
//! for every song the source reports. Cycles are strictly sequential: the
//! loop in [`PollingPipeline::run`] owns the pipeline mutably and only waits
//! for the next tick once the current cycle has returned, so a slow cycle
//! delays the next one instead of overlapping it.

use std::{fmt, future::Future, time::Duration};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::{
    error::PipelineError,
    management::{SeenTracks, SongLog},
    normalize::normalize,
    scrape::NowPlayingSource,
    spotify::{SpotifyClient, track_search_params},
    types::{MysteryRecord, NormalizedSong, ResolvedRecord, Song, Track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Scraping,
    Normalizing,
    Searching,
    Deciding,
    Appending,
    Recording,
}

/// How a song is turned into a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStyle {
    /// `artist:"<artist>" <title>`, used while polling.
    #[default]
    Loose,
    /// `artist:"<artist>" track:"<title>"`, used for bulk imports.
    Strict,
}

impl QueryStyle {
    pub fn query(self, song: &NormalizedSong) -> String {
        match self {
            QueryStyle::Loose => format!("artist:\"{}\" {}", song.artist, song.title),
            QueryStyle::Strict => format!("artist:\"{}\" track:\"{}\"", song.artist, song.title),
        }
    }
}

/// What happened to one scraped song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongOutcome {
    /// The first candidate was new and has been appended.
    Appended(Track),
    /// The first candidate is already in the playlist.
    AlreadySeen(Track),
    /// The search returned nothing; a mystery record was written.
    Mystery,
    /// The first candidate has no catalog id and cannot be deduplicated.
    Skipped(Track),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub scraped: usize,
    pub appended: usize,
    pub already_seen: usize,
    pub mysteries: usize,
    pub skipped: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scraped, {} appended, {} already in playlist, {} mysteries, {} skipped",
            self.scraped, self.appended, self.already_seen, self.mysteries, self.skipped
        )
    }
}

pub struct PollingPipeline<S> {
    client: SpotifyClient,
    source: S,
    playlist_id: String,
    seen: SeenTracks,
    songs_log: SongLog,
    mystery_log: SongLog,
    query_style: QueryStyle,
    state: CycleState,
}

impl<S: NowPlayingSource> PollingPipeline<S> {
    pub fn new(
        client: SpotifyClient,
        source: S,
        playlist_id: impl Into<String>,
        songs_log: SongLog,
        mystery_log: SongLog,
    ) -> Self {
        Self {
            client,
            source,
            playlist_id: playlist_id.into(),
            seen: SeenTracks::new(),
            songs_log,
            mystery_log,
            query_style: QueryStyle::default(),
            state: CycleState::Idle,
        }
    }

    pub fn with_query_style(mut self, style: QueryStyle) -> Self {
        self.query_style = style;
        self
    }

    pub fn seen(&self) -> &SeenTracks {
        &self.seen
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    /// Runs a cycle now and then every `every`, until `shutdown` resolves.
    ///
    /// A failed cycle is logged and the loop carries on with the next tick.
    /// On shutdown the client's request queue is closed. `every` must be
    /// non-zero.
    pub async fn run<F>(mut self, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutting down polling loop");
                    self.client.executor().scheduler().close();
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.run_cycle().await {
                Ok(report) => info!(
                    scraped = report.scraped,
                    appended = report.appended,
                    already_seen = report.already_seen,
                    mysteries = report.mysteries,
                    skipped = report.skipped,
                    "cycle finished"
                ),
                Err(e) => error!(error = %e, "cycle aborted"),
            }
        }
    }

    /// One full cycle: reset the token, reload the playlist, process every
    /// scraped song in order.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the rest of the cycle. Songs processed
    /// before it keep their effects.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, PipelineError> {
        let result = self.cycle().await;
        self.transition(CycleState::Idle);
        result
    }

    async fn cycle(&mut self) -> Result<CycleReport, PipelineError> {
        self.client.clear_access_token().await;

        let items = self.client.playlist_items(&self.playlist_id).await?;
        self.seen.reseed(&items);
        debug!(playlist_id = %self.playlist_id, seen = self.seen.len(), "reloaded playlist");

        self.transition(CycleState::Scraping);
        let songs = self.source.current_songs().await?;
        info!(
            songs = ?songs.iter().map(|s| format!("{} - {}", s.artist, s.title)).collect::<Vec<_>>(),
            "current songs"
        );

        let mut report = CycleReport {
            scraped: songs.len(),
            ..CycleReport::default()
        };
        for song in &songs {
            match self.process_song(song).await? {
                SongOutcome::Appended(_) => report.appended += 1,
                SongOutcome::AlreadySeen(_) => report.already_seen += 1,
                SongOutcome::Mystery => report.mysteries += 1,
                SongOutcome::Skipped(_) => report.skipped += 1,
            }
        }

        Ok(report)
    }

    /// Resolves one song against the catalog and acts on the first candidate.
    ///
    /// The candidate id is marked seen as soon as the append is decided, so a
    /// song reported twice in one cycle is only appended once. If the append
    /// then fails the id is taken out again, leaving the next cycle free to
    /// retry it.
    pub async fn process_song(&mut self, song: &Song) -> Result<SongOutcome, PipelineError> {
        self.transition(CycleState::Normalizing);
        let normalized = normalize(song);
        let query = self.query_style.query(&normalized);
        let params = track_search_params(&query);

        self.transition(CycleState::Searching);
        let candidate = self.client.search_tracks(&query).await?.into_iter().next();

        self.transition(CycleState::Deciding);
        let outcome = match candidate {
            None => {
                self.transition(CycleState::Recording);
                self.mystery_log
                    .append(&MysteryRecord {
                        artist: normalized.artist.clone(),
                        title: normalized.title.clone(),
                        params: params.clone(),
                    })
                    .await?;
                SongOutcome::Mystery
            }
            Some(track) => match track.id.clone() {
                Some(id) if self.seen.contains(&id) => SongOutcome::AlreadySeen(track),
                None => {
                    warn!(uri = %track.uri, "search candidate has no id, skipping");
                    SongOutcome::Skipped(track)
                }
                Some(id) => {
                    self.seen.insert(id.clone());

                    self.transition(CycleState::Appending);
                    if let Err(e) = self
                        .client
                        .add_tracks(&self.playlist_id, std::slice::from_ref(&track.uri))
                        .await
                    {
                        self.seen.remove(&id);
                        return Err(e.into());
                    }

                    self.transition(CycleState::Recording);
                    self.songs_log
                        .append(&ResolvedRecord {
                            artist: normalized.artist.clone(),
                            title: normalized.title.clone(),
                            played_at: normalized.played_at.clone(),
                            scraped_at: normalized.scraped_at,
                            track_id: id,
                            track_uri: track.uri.clone(),
                            params: params.clone(),
                        })
                        .await?;
                    SongOutcome::Appended(track)
                }
            },
        };

        info!(
            artist = %normalized.artist,
            title = %normalized.title,
            search_params = %params,
            outcome = outcome_label(&outcome),
            "processed song"
        );
        Ok(outcome)
    }

    fn transition(&mut self, next: CycleState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "pipeline state");
            self.state = next;
        }
    }
}

fn outcome_label(outcome: &SongOutcome) -> &'static str {
    match outcome {
        SongOutcome::Appended(_) => "appended",
        SongOutcome::AlreadySeen(_) => "already_seen",
        SongOutcome::Mystery => "mystery",
        SongOutcome::Skipped(_) => "skipped",
    }
}
