use std::time::Duration;

use anyhow::Result;
use tv_ascii::Compositor;
use tv_core::charset::Charset;
use tv_core::clock::{CancelToken, Clock};
use tv_core::config::{FpsPrecedence, PlaybackConfig};
use tv_core::traits::{FrameSource, TerminalSink};
use tv_render::pacing::{PacingController, StopReason, resolve_target_period};
use tv_render::stats;
use tv_source::resize::Downscaler;

/// Réglages figés pour la durée d'une session.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub width: u16,
    pub fps_override: u32,
    pub fps_precedence: FpsPrecedence,
    pub color: bool,
    pub batched: bool,
    pub charset: Charset,
    pub intro_delay: Duration,
    pub max_frames: Option<u64>,
}

impl SessionSettings {
    /// Extract session settings from a clamped config.
    #[must_use]
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            width: config.width,
            fps_override: config.fps_override,
            fps_precedence: config.fps_precedence,
            color: config.color_enabled,
            batched: config.use_batched_path,
            charset: config.charset(),
            intro_delay: Duration::try_from_secs_f32(config.intro_delay_secs).unwrap_or_default(),
            max_frames: config.max_frames,
        }
    }
}

/// Bilan d'une session terminée.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSummary {
    pub stop: StopReason,
    pub frames: u64,
    pub average_processing: Option<Duration>,
    pub lag_events: u64,
    pub target_period: Duration,
}

/// Boucle de lecture : décoder → réduire → mapper → composer → afficher → attendre.
///
/// Owns the source, the sink and the pacing state. The source is released
/// exactly once whichever way the loop ends.
pub struct PlaybackSession<S: FrameSource, T: TerminalSink, C: Clock> {
    source: S,
    sink: T,
    pacer: PacingController<C>,
    compositor: Compositor,
    downscaler: Downscaler,
    settings: SessionSettings,
    cancel: CancelToken,
}

impl<S: FrameSource, T: TerminalSink, C: Clock> PlaybackSession<S, T, C> {
    #[must_use]
    pub fn new(
        source: S,
        sink: T,
        clock: C,
        settings: SessionSettings,
        cancel: CancelToken,
    ) -> Self {
        let compositor =
            Compositor::new(settings.charset.clone(), settings.color, settings.batched);
        Self {
            source,
            sink,
            pacer: PacingController::new(clock),
            compositor,
            downscaler: Downscaler::new(),
            settings,
            cancel,
        }
    }

    /// Joue la source jusqu'à épuisement, annulation, limite ou erreur.
    ///
    /// Returns the sink alongside the summary so the caller can restore
    /// terminal state on it.
    ///
    /// # Errors
    /// Any decode, resize or terminal error raised mid-loop. The source is
    /// released, the pacer is `Stopped(Failed)` and the final stats are
    /// written before it is returned.
    pub fn run(mut self) -> (T, Result<SessionSummary>) {
        let outcome = self.play();
        self.source.release();

        let result = match outcome {
            Ok(reason) => {
                self.pacer.stop(reason);
                let summary = self.summary(reason);
                log::info!(
                    "Session terminée ({:?}) : {} frames, {} en retard",
                    summary.stop,
                    summary.frames,
                    summary.lag_events
                );
                Ok(summary)
            }
            Err(e) => {
                self.pacer.stop(StopReason::Failed);
                log::error!(
                    "Session interrompue par une erreur après {} frames : {e:#}",
                    self.pacer.frame_count()
                );
                let stats = stats::failed_text(self.pacer.average_processing());
                if let Err(w) = self.sink.write(&stats) {
                    log::warn!("Statistiques finales non écrites : {w:#}");
                }
                Err(e)
            }
        };
        (self.sink, result)
    }

    fn play(&mut self) -> Result<StopReason> {
        let source_fps = self.source.nominal_fps();
        let target = resolve_target_period(
            source_fps,
            self.settings.fps_override,
            self.settings.fps_precedence,
        );
        let (w, h) = self.source.native_size();
        log::info!(
            "Source {w}x{h} @ {source_fps} fps, période cible {:.4}s, stratégie {}",
            target.as_secs_f64(),
            self.compositor.strategy()
        );

        self.sink.write(&stats::banner(
            source_fps,
            target,
            self.settings.color,
            self.settings.charset.name(),
            self.settings.batched,
        ))?;
        if !self.settings.intro_delay.is_zero() {
            self.pacer.clock().sleep(self.settings.intro_delay);
        }

        self.pacer.start(target)?;
        loop {
            if self.cancel.is_cancelled() {
                self.sink
                    .write(&stats::interrupted_text(self.pacer.average_processing()))?;
                return Ok(StopReason::Cancelled);
            }
            if let Some(max) = self.settings.max_frames
                && self.pacer.frame_count() >= max
            {
                return Ok(StopReason::Normal);
            }

            self.pacer.begin_cycle();
            let Some(frame) = self.source.next_frame()? else {
                return Ok(StopReason::SourceExhausted);
            };
            let cells = self.downscaler.downscale(&frame, self.settings.width)?;
            let text = self.compositor.render(&cells);
            self.sink.clear_screen()?;
            self.sink.write(text)?;

            let report = self.pacer.end_cycle();
            if let Some(ref cp) = report.checkpoint {
                self.sink.write(&stats::checkpoint_text(cp))?;
            }
            self.pacer.suspend(&report);
        }
    }

    fn summary(&self, stop: StopReason) -> SessionSummary {
        SessionSummary {
            stop,
            frames: self.pacer.frame_count(),
            average_processing: self.pacer.average_processing(),
            lag_events: self.pacer.lag_events(),
            target_period: self.pacer.target_period(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use tv_core::clock::ManualClock;
    use tv_core::config::CharsetMode;
    use tv_core::frame::{Channels, Frame};

    struct ScriptedSource {
        fps: f64,
        frames: VecDeque<Result<Frame>>,
        releases: Rc<Cell<u32>>,
    }

    impl ScriptedSource {
        fn new(fps: f64, frames: Vec<Result<Frame>>) -> (Self, Rc<Cell<u32>>) {
            let releases = Rc::new(Cell::new(0));
            let source = Self {
                fps,
                frames: frames.into(),
                releases: Rc::clone(&releases),
            };
            (source, releases)
        }
    }

    impl FrameSource for ScriptedSource {
        fn nominal_fps(&self) -> f64 {
            self.fps
        }

        fn native_size(&self) -> (u32, u32) {
            (16, 16)
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            self.frames.pop_front().transpose()
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    /// Enregistre tout ; peut simuler un coût de rendu et un Ctrl+C.
    struct RecordingSink<'a> {
        clock: &'a ManualClock,
        cost: Duration,
        clears: u32,
        frames: Vec<String>,
        writes: Vec<String>,
        cancel_after: Option<(u32, CancelToken)>,
    }

    impl<'a> RecordingSink<'a> {
        fn new(clock: &'a ManualClock, cost: Duration) -> Self {
            Self {
                clock,
                cost,
                clears: 0,
                frames: Vec::new(),
                writes: Vec::new(),
                cancel_after: None,
            }
        }
    }

    impl TerminalSink for RecordingSink<'_> {
        fn clear_screen(&mut self) -> Result<()> {
            self.clears += 1;
            Ok(())
        }

        fn write(&mut self, text: &str) -> Result<()> {
            self.writes.push(text.to_owned());
            if self.frames.len() < self.clears as usize {
                self.clock.advance(self.cost);
                self.frames.push(text.to_owned());
                if let Some((n, ref token)) = self.cancel_after
                    && self.frames.len() as u32 == n
                {
                    token.cancel();
                }
            }
            Ok(())
        }
    }

    fn settings(color: bool, batched: bool) -> SessionSettings {
        SessionSettings {
            width: 8,
            fps_override: 0,
            fps_precedence: FpsPrecedence::Source,
            color,
            batched,
            charset: Charset::for_mode(CharsetMode::Ascii),
            intro_delay: Duration::ZERO,
            max_frames: None,
        }
    }

    fn black() -> Result<Frame> {
        Ok(Frame::new(16, 16, Channels::Rgb))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn three_frames_then_exhaustion() {
        let clock = ManualClock::new();
        let (source, releases) = ScriptedSource::new(25.0, vec![black(), black(), black()]);
        let sink = RecordingSink::new(&clock, ms(10));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, true), CancelToken::new());

        let (sink, result) = session.run();
        let summary = result.unwrap();

        assert_eq!(summary.stop, StopReason::SourceExhausted);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.target_period, ms(40));
        assert_eq!(summary.average_processing, Some(ms(10)));
        assert_eq!(releases.get(), 1);
        assert_eq!(sink.clears, 3);
        assert_eq!(sink.frames.len(), 3);
        // 16x16 → 8 colonnes, 4 lignes, tout noir.
        assert_eq!(sink.frames[0], "        \n".repeat(4));
        assert_eq!(clock.sleeps(), vec![ms(30); 3]);
    }

    #[test]
    fn banner_comes_first() {
        let clock = ManualClock::new();
        let (source, _) = ScriptedSource::new(0.0, vec![]);
        let sink = RecordingSink::new(&clock, ms(0));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(true, true), CancelToken::new());

        let (sink, result) = session.run();
        let summary = result.unwrap();

        assert_eq!(summary.frames, 0);
        assert_eq!(summary.target_period, Duration::from_secs(1));
        assert!(sink.writes[0].contains("Target frame time: 1.0000 seconds"));
        assert!(sink.writes[0].contains("Character set: ASCII"));
        assert!(summary.average_processing.is_none());
    }

    #[test]
    fn intro_delay_sleeps_once_before_playback() {
        let clock = ManualClock::new();
        let (source, _) = ScriptedSource::new(25.0, vec![black()]);
        let sink = RecordingSink::new(&clock, ms(0));
        let mut cfg = settings(false, false);
        cfg.intro_delay = Duration::from_secs(2);
        let session = PlaybackSession::new(source, sink, &clock, cfg, CancelToken::new());

        let (_, result) = session.run();
        result.unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2), ms(40)]);
    }

    #[test]
    fn cancellation_stops_at_cycle_boundary() {
        let clock = ManualClock::new();
        let token = CancelToken::new();
        let frames = (0..10).map(|_| black()).collect();
        let (source, releases) = ScriptedSource::new(25.0, frames);
        let mut sink = RecordingSink::new(&clock, ms(8));
        sink.cancel_after = Some((2, token.clone()));
        let session = PlaybackSession::new(source, sink, &clock, settings(false, true), token);

        let (sink, result) = session.run();
        let summary = result.unwrap();

        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.frames, 2);
        assert_eq!(releases.get(), 1);
        let last = sink.writes.last().unwrap();
        assert!(last.contains("Video playback interrupted."));
        assert!(last.contains("Final stats - Average processing time: 0.0080s per frame"));
    }

    #[test]
    fn cancelled_before_first_frame_has_no_average() {
        let clock = ManualClock::new();
        let token = CancelToken::new();
        token.cancel();
        let (source, releases) = ScriptedSource::new(25.0, vec![black()]);
        let sink = RecordingSink::new(&clock, ms(0));
        let session = PlaybackSession::new(source, sink, &clock, settings(false, true), token);

        let (sink, result) = session.run();
        assert_eq!(result.unwrap().frames, 0);
        assert_eq!(releases.get(), 1);
        assert_eq!(sink.writes.last().unwrap(), "\nVideo playback interrupted.\n");
    }

    #[test]
    fn decode_error_releases_and_propagates() {
        let clock = ManualClock::new();
        let (source, releases) = ScriptedSource::new(
            25.0,
            vec![black(), Err(anyhow::anyhow!("flux corrompu"))],
        );
        let sink = RecordingSink::new(&clock, ms(0));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, true), CancelToken::new());

        let (sink, result) = session.run();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("flux corrompu"));
        assert_eq!(releases.get(), 1);
        assert_eq!(sink.clears, 1);
    }

    #[test]
    fn decode_error_still_reports_final_average() {
        let clock = ManualClock::new();
        let (source, releases) = ScriptedSource::new(
            25.0,
            vec![black(), black(), Err(anyhow::anyhow!("flux corrompu"))],
        );
        let sink = RecordingSink::new(&clock, ms(6));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, true), CancelToken::new());

        let (sink, result) = session.run();
        assert!(result.is_err());
        assert_eq!(releases.get(), 1);
        assert_eq!(sink.frames.len(), 2);
        let last = sink.writes.last().unwrap();
        assert!(last.contains("Video playback failed."));
        assert!(last.contains("Final stats - Average processing time: 0.0060s per frame"));
    }

    #[test]
    fn max_frames_is_a_normal_stop() {
        let clock = ManualClock::new();
        let frames = (0..5).map(|_| black()).collect();
        let (source, releases) = ScriptedSource::new(30.0, frames);
        let sink = RecordingSink::new(&clock, ms(1));
        let mut cfg = settings(false, true);
        cfg.max_frames = Some(2);
        let session = PlaybackSession::new(source, sink, &clock, cfg, CancelToken::new());

        let (sink, result) = session.run();
        let summary = result.unwrap();
        assert_eq!(summary.stop, StopReason::Normal);
        assert_eq!(summary.frames, 2);
        assert_eq!(sink.clears, 2);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn slow_frames_never_sleep() {
        let clock = ManualClock::new();
        let frames = (0..4).map(|_| black()).collect();
        let (source, _) = ScriptedSource::new(50.0, frames);
        let sink = RecordingSink::new(&clock, ms(35));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, true), CancelToken::new());

        let (_, result) = session.run();
        let summary = result.unwrap();
        assert_eq!(summary.lag_events, 4);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn checkpoint_written_after_sixtieth_frame() {
        let clock = ManualClock::new();
        let frames = (0..61).map(|_| black()).collect();
        let (source, _) = ScriptedSource::new(25.0, frames);
        let sink = RecordingSink::new(&clock, ms(10));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, false), CancelToken::new());

        let (sink, result) = session.run();
        result.unwrap();
        let stats: Vec<_> = sink
            .writes
            .iter()
            .filter(|w| w.contains("Average processing time"))
            .collect();
        assert_eq!(stats.len(), 1);
        assert!(stats[0].contains("Frame 60: Processing 0.0100s, Sleep 0.0300s"));
    }

    #[test]
    fn strategies_render_identical_frames() {
        let mut data = Vec::with_capacity(16 * 16 * 3);
        for i in 0..16 * 16 * 3 {
            data.push((i * 7 % 256) as u8);
        }
        let pattern = Frame::from_raw(16, 16, Channels::Rgb, data).unwrap();

        let render = |batched: bool| {
            let clock = ManualClock::new();
            let (source, _) = ScriptedSource::new(25.0, vec![Ok(pattern.clone())]);
            let sink = RecordingSink::new(&clock, ms(0));
            let session = PlaybackSession::new(
                source,
                sink,
                &clock,
                settings(true, batched),
                CancelToken::new(),
            );
            let (sink, result) = session.run();
            result.unwrap();
            sink.frames
        };

        let scalar = render(false);
        assert_eq!(scalar, render(true));
        assert_eq!(scalar[0].matches("\x1b[0m").count(), 8 * 4);
    }

    #[test]
    fn color_off_emits_no_escapes() {
        let clock = ManualClock::new();
        let (source, _) = ScriptedSource::new(
            25.0,
            vec![Ok(Frame::solid(16, 16, Channels::Rgb, (200, 40, 90)))],
        );
        let sink = RecordingSink::new(&clock, ms(0));
        let session =
            PlaybackSession::new(source, sink, &clock, settings(false, true), CancelToken::new());

        let (sink, result) = session.run();
        result.unwrap();
        assert!(!sink.frames[0].contains('\x1b'));
    }
}
