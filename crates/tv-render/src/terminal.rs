use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use tv_core::traits::TerminalSink;

/// Sink terminal basé sur les séquences crossterm.
///
/// Nothing reaches the terminal until `write`, which flushes the
/// queued clear together with the frame text.
///
/// # Example
/// ```
/// use tv_core::traits::TerminalSink;
/// use tv_render::terminal::CrosstermSink;
/// let mut sink = CrosstermSink::new(Vec::new());
/// sink.clear_screen().unwrap();
/// sink.write("@@\n").unwrap();
/// let bytes = sink.into_inner();
/// assert!(bytes.ends_with(b"@@\n"));
/// ```
pub struct CrosstermSink<W: Write> {
    out: W,
}

impl CrosstermSink<Stdout> {
    /// Sink sur la sortie standard.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CrosstermSink<W> {
    /// Wrap any writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Masque le curseur pendant la lecture.
    ///
    /// # Errors
    /// Returns an error if the terminal write fails.
    pub fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.out, Hide).context("Masquage du curseur")?;
        self.out.flush()?;
        Ok(())
    }

    /// Réaffiche le curseur.
    ///
    /// # Errors
    /// Returns an error if the terminal write fails.
    pub fn show_cursor(&mut self) -> Result<()> {
        queue!(self.out, Show).context("Affichage du curseur")?;
        self.out.flush()?;
        Ok(())
    }

    /// Récupère le writer sous-jacent.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TerminalSink for CrosstermSink<W> {
    fn clear_screen(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0)).context("Effacement de l'écran")?;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .context("Écriture terminal")?;
        self.out.flush().context("Flush terminal")?;
        Ok(())
    }
}
