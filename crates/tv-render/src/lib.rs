/// Terminal output and real-time pacing for termvid.
///
/// Provides the pacing controller, the crossterm sink and the
/// statistics text shown during playback.
pub mod pacing;
pub mod stats;
pub mod terminal;
