/// Types, traits, and configuration shared across the termvid workspace.
///
/// This crate contains the frame and grid types, the charset tables,
/// the playback configuration and the seams (source, sink, processor, clock)
/// the other crates plug into.

pub mod charset;
pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use charset::Charset;
pub use clock::{CancelToken, Clock, SystemClock};
pub use config::PlaybackConfig;
pub use error::CoreError;
pub use frame::{Channels, CharGrid, Frame, Glyph};

/// Re-exports pour accès par chemin sémantique.
pub mod grid {
    pub use crate::frame::{CharGrid, Glyph};
}
