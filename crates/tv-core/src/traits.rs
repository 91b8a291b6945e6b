use anyhow::Result;

use crate::frame::{CharGrid, Frame};

/// Fournit des frames décodées à la session, une à la fois.
///
/// Implémenté par : `FfmpegSource`.
///
/// # Example
/// ```
/// use tv_core::traits::FrameSource;
/// use tv_core::frame::Frame;
///
/// struct DummySource;
/// impl FrameSource for DummySource {
///     fn nominal_fps(&self) -> f64 { 0.0 }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> { Ok(None) }
///     fn release(&mut self) {}
/// }
/// ```
pub trait FrameSource {
    /// Débit nominal annoncé par la source, `0.0` si inconnu.
    fn nominal_fps(&self) -> f64;

    /// Dimensions natives des frames.
    fn native_size(&self) -> (u32, u32);

    /// Retourne la prochaine frame, `None` en fin de flux.
    ///
    /// Peut bloquer le temps du décodage.
    ///
    /// # Errors
    /// Any decode anomaly; the session treats it as terminal.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Libère le handle. Appelé exactement une fois par la session.
    fn release(&mut self);
}

/// Destination du texte rendu.
///
/// Invoked once per rendered frame by the session, never by pipeline stages.
pub trait TerminalSink {
    /// Efface l'écran et replace le curseur en haut à gauche.
    ///
    /// # Errors
    /// Returns an error if the underlying terminal write fails.
    fn clear_screen(&mut self) -> Result<()>;

    /// Écrit un bloc de texte tel quel.
    ///
    /// # Errors
    /// Returns an error if the underlying terminal write fails.
    fn write(&mut self, text: &str) -> Result<()>;
}

/// Transforme une frame réduite en grille de glyphes, puis en texte.
///
/// Scalar and batched strategies implement this trait and must produce
/// byte-identical `compose` output for the same input.
///
/// # Example
/// ```
/// use tv_core::traits::Processor;
/// use tv_core::frame::{CharGrid, Frame};
///
/// struct DummyProcessor;
/// impl Processor for DummyProcessor {
///     fn process(&self, _input: &Frame, _output: &mut CharGrid) {}
///     fn compose(&self, _grid: &CharGrid, _out: &mut String) {}
///     fn name(&self) -> &'static str { "dummy" }
/// }
/// ```
pub trait Processor: Send + Sync {
    /// Map every pixel of `input` to a glyph in `output`.
    ///
    /// `output` is reshaped to `input.width × input.height`.
    fn process(&self, input: &Frame, output: &mut CharGrid);

    /// Append the renderable text block for `grid` to `out`.
    fn compose(&self, grid: &CharGrid, out: &mut String);

    /// Nom lisible pour le debug/UI.
    fn name(&self) -> &'static str;
}
