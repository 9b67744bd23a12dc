//! Fixes for the way the station's metadata mangles names.
//!
//! The feed is produced by software that mixes up code pages, so some
//! artists arrive with Cyrillic look-alikes in place of accented Latin
//! letters. A static table maps the known spellings back; titles lose their
//! parenthetical suffix ("(Remix)", "(Live)") which the catalog search
//! handles badly.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{NormalizedSong, Song};

const ARTIST_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("Bj╤årk", "Björk"),
    ("Bjцrk", "Björk"),
    ("Sinйad O'Connor", "Sinead O'Connor"),
    ("INKRДKTARE", "INKRÄKTARE"),
    ("Jуnsi", "Jonsi"),
    ("Sigur Roґs", "Sigur Ros"),
    ("Sigur Rуs", "Sigur Ros"),
    ("Massive Attack & Azekel", "Massive Attack"),
    ("The Sisters Of Mercy", "Sisters Of Mercy"),
    ("Rцyksopp", "Royksopp"),
];

const TITLE_TYPOS: &[(&str, &str)] = &[("Draems", "Dreams")];

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \(.*\)").expect("static pattern is valid"));

pub fn normalize_artist(artist: &str) -> String {
    let artist = artist.trim();
    ARTIST_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == artist)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| artist.to_string())
}

pub fn normalize_title(title: &str) -> String {
    let title = title.replace("''", "'");
    let mut title = PARENTHETICAL.replace(&title, "").into_owned();
    for (from, to) in TITLE_TYPOS {
        title = title.replacen(from, to, 1);
    }
    title.trim().to_string()
}

pub fn normalize(song: &Song) -> NormalizedSong {
    NormalizedSong {
        artist: normalize_artist(&song.artist),
        title: normalize_title(&song.title),
        played_at: song.played_at.clone(),
        scraped_at: song.scraped_at,
    }
}
