use std::time::{Duration, Instant};

use anyhow::Result;
use tv_core::clock::{Clock, SystemClock};
use tv_core::config::FpsPrecedence;

/// Statistiques publiées toutes les `STATS_INTERVAL` frames (60, 120, …).
pub const STATS_INTERVAL: u64 = 60;

/// Why a session left the `Running` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Arrêt demandé par l'appelant (limite `max_frames`).
    Normal,
    /// Ctrl+C ou autre annulation coopérative.
    Cancelled,
    /// La source n'a plus de frames.
    SourceExhausted,
    /// Erreur en cours de boucle ; le nettoyage a quand même eu lieu.
    Failed,
}

/// État du contrôleur de cadence.
///
/// # Example
/// ```
/// use tv_render::pacing::{PacingController, PacingState};
/// use tv_core::clock::ManualClock;
/// let pacer = PacingController::new(ManualClock::new());
/// assert_eq!(pacer.state(), PacingState::Idle);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingState {
    Idle,
    Running,
    Stopped(StopReason),
}

/// Période cible d'une frame.
///
/// With [`FpsPrecedence::Source`] a positive source rate wins and a positive
/// `fps_override` is the fallback; [`FpsPrecedence::Override`] swaps them.
/// With neither, the period is one second.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tv_core::config::FpsPrecedence;
/// use tv_render::pacing::resolve_target_period;
/// assert_eq!(resolve_target_period(0.0, 0, FpsPrecedence::Source), Duration::from_secs(1));
/// assert_eq!(resolve_target_period(25.0, 10, FpsPrecedence::Source), Duration::from_millis(40));
/// let period = resolve_target_period(25.0, 10, FpsPrecedence::Override);
/// assert_eq!(period, Duration::from_millis(100));
/// ```
#[must_use]
pub fn resolve_target_period(
    source_fps: f64,
    fps_override: u32,
    precedence: FpsPrecedence,
) -> Duration {
    let source = (source_fps.is_finite() && source_fps > 0.0).then_some(source_fps);
    let requested = (fps_override > 0).then(|| f64::from(fps_override));
    let fps = match precedence {
        FpsPrecedence::Source => source.or(requested),
        FpsPrecedence::Override => requested.or(source),
    };
    fps.and_then(|f| Duration::try_from_secs_f64(1.0 / f).ok())
        .unwrap_or(Duration::from_secs(1))
}

/// Snapshot published on every `STATS_INTERVAL`-th frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    /// Numéro de frame (1-indexé).
    pub frame: u64,
    /// Coût de traitement de cette frame.
    pub processing: Duration,
    /// `target - processing` en secondes, négatif si en retard.
    pub sleep_secs: f64,
    /// `total_processing / frame_count`.
    pub average: Duration,
    /// `sleep_secs <= 0`.
    pub behind: bool,
    /// Débit d'affichage mesuré depuis le checkpoint précédent.
    pub measured_fps: f64,
}

/// Résultat d'un cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleReport {
    /// Numéro de frame (1-indexé).
    pub frame: u64,
    /// Coût de traitement mesuré.
    pub processing: Duration,
    /// `target - processing` en secondes, signé.
    pub sleep_secs: f64,
    /// Délai effectivement appliqué, jamais négatif.
    pub delay: Duration,
    /// Lag event : aucun délai possible.
    pub behind: bool,
    /// Présent sur les frames 60, 120, …
    pub checkpoint: Option<Checkpoint>,
}

/// Frames par seconde sur une fenêtre de `STATS_INTERVAL` cycles.
fn display_rate(window: Duration) -> f64 {
    let secs = window.as_secs_f64();
    if secs > 0.0 {
        STATS_INTERVAL as f64 / secs
    } else {
        0.0
    }
}

/// Contrôleur de cadence : mesure chaque cycle et dort le temps restant.
///
/// `Idle → Running → Stopped(reason)`. Frame count, cumulative processing
/// time and lag events live here, not in globals.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tv_core::clock::ManualClock;
/// use tv_render::pacing::PacingController;
///
/// let clock = ManualClock::new();
/// let mut pacer = PacingController::new(&clock);
/// pacer.start(Duration::from_millis(40)).unwrap();
/// pacer.begin_cycle();
/// clock.advance(Duration::from_millis(15));
/// let report = pacer.end_cycle();
/// pacer.suspend(&report);
/// assert_eq!(report.delay, Duration::from_millis(25));
/// assert_eq!(clock.sleeps(), vec![Duration::from_millis(25)]);
/// ```
pub struct PacingController<C: Clock = SystemClock> {
    clock: C,
    state: PacingState,
    target_period: Duration,
    frame_count: u64,
    total_processing: Duration,
    lag_events: u64,
    cycle_start: Option<Instant>,
    /// Début de la fenêtre de mesure du débit d'affichage.
    window_start: Option<Instant>,
}

impl<C: Clock> PacingController<C> {
    /// Contrôleur au repos.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: PacingState::Idle,
            target_period: Duration::from_secs(1),
            frame_count: 0,
            total_processing: Duration::ZERO,
            lag_events: 0,
            cycle_start: None,
            window_start: None,
        }
    }

    /// `Idle → Running` avec la période cible donnée.
    ///
    /// # Errors
    /// Returns an error if the controller is not idle.
    pub fn start(&mut self, target_period: Duration) -> Result<()> {
        anyhow::ensure!(
            self.state == PacingState::Idle,
            "Contrôleur déjà démarré ({:?})",
            self.state
        );
        self.target_period = target_period;
        self.state = PacingState::Running;
        self.window_start = Some(self.clock.now());
        log::debug!("Pacing: période cible {:.4}s", target_period.as_secs_f64());
        Ok(())
    }

    /// Marque le début d'un cycle (avant le décodage).
    pub fn begin_cycle(&mut self) {
        debug_assert_eq!(self.state, PacingState::Running);
        self.cycle_start = Some(self.clock.now());
    }

    /// Clôt le cycle : mesure, accumule, compte, et calcule le délai.
    pub fn end_cycle(&mut self) -> CycleReport {
        let now = self.clock.now();
        let start = self.cycle_start.take().unwrap_or(now);
        let processing = now.saturating_duration_since(start);

        self.total_processing += processing;
        self.frame_count += 1;

        let sleep_secs = self.target_period.as_secs_f64() - processing.as_secs_f64();
        let delay = self.target_period.saturating_sub(processing);
        let behind = delay.is_zero();
        if behind {
            self.lag_events += 1;
        }

        let checkpoint = if self.frame_count % STATS_INTERVAL == 0 {
            let window = now.saturating_duration_since(self.window_start.unwrap_or(now));
            self.window_start = Some(now);
            Some(Checkpoint {
                frame: self.frame_count,
                processing,
                sleep_secs,
                average: self.average_processing().unwrap_or_default(),
                behind,
                measured_fps: display_rate(window),
            })
        } else {
            None
        };
        if let Some(ref cp) = checkpoint
            && cp.behind
        {
            log::warn!(
                "Frame {}: en retard ({:.4}s de traitement pour {:.4}s de budget)",
                cp.frame,
                processing.as_secs_f64(),
                self.target_period.as_secs_f64()
            );
        }

        CycleReport {
            frame: self.frame_count,
            processing,
            sleep_secs,
            delay,
            behind,
            checkpoint,
        }
    }

    /// Dort `report.delay` ; rien si le cycle est en retard.
    pub fn suspend(&self, report: &CycleReport) {
        if !report.delay.is_zero() {
            self.clock.sleep(report.delay);
        }
    }

    /// `Running → Stopped(reason)`. Sans effet si déjà arrêté.
    pub fn stop(&mut self, reason: StopReason) {
        if !matches!(self.state, PacingState::Stopped(_)) {
            self.state = PacingState::Stopped(reason);
            self.cycle_start = None;
        }
    }

    /// Horloge sous-jacente.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// État courant.
    #[must_use]
    pub fn state(&self) -> PacingState {
        self.state
    }

    /// Période cible.
    #[must_use]
    pub fn target_period(&self) -> Duration {
        self.target_period
    }

    /// Frames terminées.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Cycles en retard.
    #[must_use]
    pub fn lag_events(&self) -> u64 {
        self.lag_events
    }

    /// Coût moyen par frame, `None` avant la première frame.
    #[must_use]
    pub fn average_processing(&self) -> Option<Duration> {
        (self.frame_count > 0).then(|| {
            let nanos = self.total_processing.as_nanos() / u128::from(self.frame_count);
            Duration::from_nanos(nanos as u64)
        })
    }
}
