mod records;
mod seen;

pub use records::SongLog;
pub use seen::SeenTracks;
