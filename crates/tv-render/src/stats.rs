use std::fmt::Write;
use std::time::Duration;

use crate::pacing::Checkpoint;

/// Bannière affichée avant la lecture.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tv_render::stats::banner;
/// let text = banner(25.0, Duration::from_millis(40), true, "ASCII", false);
/// assert!(text.contains("Target frame time: 0.0400 seconds"));
/// assert!(text.contains("Optimization: OFF"));
/// ```
#[must_use]
pub fn banner(
    source_fps: f64,
    target: Duration,
    color: bool,
    charset_name: &str,
    batched: bool,
) -> String {
    let on_off = |b: bool| if b { "ON" } else { "OFF" };
    let mut s = String::new();
    let _ = writeln!(s, "Video FPS: {source_fps}");
    let _ = writeln!(s, "Target frame time: {:.4} seconds", target.as_secs_f64());
    let _ = writeln!(s, "Color mode: {}", on_off(color));
    let _ = writeln!(s, "Character set: {charset_name}");
    let _ = writeln!(s, "Optimization: {}", on_off(batched));
    s.push_str("Press Ctrl+C to stop...\n");
    s
}

/// Bloc de statistiques écrit après la frame d'un checkpoint.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tv_render::pacing::Checkpoint;
/// use tv_render::stats::checkpoint_text;
/// let cp = Checkpoint {
///     frame: 60,
///     processing: Duration::from_millis(12),
///     sleep_secs: 0.028,
///     average: Duration::from_millis(11),
///     behind: false,
///     measured_fps: 25.0,
/// };
/// let text = checkpoint_text(&cp);
/// assert!(text.contains("Frame 60: Processing 0.0120s, Sleep 0.0280s"));
/// assert!(!text.contains("behind"));
/// ```
#[must_use]
pub fn checkpoint_text(cp: &Checkpoint) -> String {
    let mut s = String::from("\n");
    let _ = writeln!(
        s,
        "Frame {}: Processing {:.4}s, Sleep {:.4}s",
        cp.frame,
        cp.processing.as_secs_f64(),
        cp.sleep_secs
    );
    let _ = writeln!(
        s,
        "Average processing time: {:.4}s",
        cp.average.as_secs_f64()
    );
    let _ = writeln!(s, "Display rate: {:.1} fps", cp.measured_fps);
    if cp.behind {
        s.push_str("⚠️  Running behind schedule!\n");
    }
    s
}

/// Message d'interruption, avec la moyenne finale si au moins une frame.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tv_render::stats::interrupted_text;
/// assert_eq!(interrupted_text(None), "\nVideo playback interrupted.\n");
/// assert!(interrupted_text(Some(Duration::from_millis(5))).contains("0.0050s per frame"));
/// ```
#[must_use]
pub fn interrupted_text(average: Option<Duration>) -> String {
    final_stats("Video playback interrupted.", average)
}

/// Même bilan quand la lecture s'arrête sur une erreur.
#[must_use]
pub fn failed_text(average: Option<Duration>) -> String {
    final_stats("Video playback failed.", average)
}

fn final_stats(headline: &str, average: Option<Duration>) -> String {
    let mut s = format!("\n{headline}\n");
    if let Some(avg) = average {
        let _ = writeln!(
            s,
            "Final stats - Average processing time: {:.4}s per frame",
            avg.as_secs_f64()
        );
    }
    s
}
