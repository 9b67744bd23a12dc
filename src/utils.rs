use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};

/// Random value for the `state` parameter of the authorization request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Decodes HTML entities such as `&amp;` or `&#39;`.
///
/// Text that is not valid markup is returned unchanged.
pub fn decode_entities(text: &str) -> String {
    htmlescape::decode_html(text).unwrap_or_else(|_| text.to_string())
}

/// Splits `"Artist - Title"` on the first separator and decodes both halves.
///
/// Returns `None` when there is no separator or either side is empty.
pub fn split_artist_title(raw: &str) -> Option<(String, String)> {
    let (artist, title) = raw.split_once(" - ")?;
    let artist = decode_entities(artist.trim());
    let title = decode_entities(title.trim());
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist, title))
}

/// Converts Icecast's `metadata_updated` (`19/Oct/2026:14:03:12 +0200`) to RFC 3339.
pub fn parse_icecast_timestamp(raw: &str) -> Option<String> {
    DateTime::parse_from_str(raw.trim(), "%d/%b/%Y:%H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339())
}

/// Milliseconds since the epoch, used as a cache buster on source URLs.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
