use rayon::prelude::*;
use tv_core::charset::Charset;
use tv_core::frame::{CharGrid, Frame, Glyph};
use tv_core::traits::Processor;

use crate::color_map::{self, RESET};
use crate::luminance::{map_row_lut, map_row_scalar};

/// Append one grid row and its line break to `out`.
///
/// Colored glyphs are wrapped as `tag, glyph, reset`; uncolored ones are
/// written bare. Both strategies compose through this function.
///
/// # Example
/// ```
/// use tv_ascii::compositor::write_row;
/// use tv_core::frame::Glyph;
/// let mut s = String::new();
/// write_row(&[Glyph { ch: '#', color: None }, Glyph { ch: '@', color: Some((1, 2, 3)) }], &mut s);
/// assert_eq!(s, "#\x1b[38;2;1;2;3m@\x1b[0m\n");
/// ```
#[inline]
pub fn write_row(row: &[Glyph], out: &mut String) {
    for glyph in row {
        if let Some(rgb) = glyph.color {
            color_map::write_tag(out, rgb);
            out.push(glyph.ch);
            out.push_str(RESET);
        } else {
            out.push(glyph.ch);
        }
    }
    out.push('\n');
}

/// Grid dimensions for a downscaled frame, one cell per pixel.
fn grid_dims(input: &Frame) -> (u16, u16) {
    (
        input.width.min(u32::from(u16::MAX)) as u16,
        input.height.min(u32::from(u16::MAX)) as u16,
    )
}

/// Stratégie scalaire : une cellule à la fois, une ligne à la fois.
///
/// # Example
/// ```
/// use tv_ascii::compositor::ScalarProcessor;
/// use tv_core::charset::Charset;
/// use tv_core::frame::{Channels, CharGrid, Frame};
/// use tv_core::traits::Processor;
///
/// let p = ScalarProcessor::new(Charset::new("t", " #").unwrap(), false);
/// let frame = Frame::solid(3, 1, Channels::Gray, (255, 255, 255));
/// let mut grid = CharGrid::new(0, 0);
/// p.process(&frame, &mut grid);
/// let mut text = String::new();
/// p.compose(&grid, &mut text);
/// assert_eq!(text, "###\n");
/// ```
pub struct ScalarProcessor {
    charset: Charset,
    color: bool,
}

impl ScalarProcessor {
    /// Create a scalar processor.
    #[must_use]
    pub fn new(charset: Charset, color: bool) -> Self {
        Self { charset, color }
    }
}

impl Processor for ScalarProcessor {
    fn process(&self, input: &Frame, output: &mut CharGrid) {
        let (w, h) = grid_dims(input);
        output.resize(w, h);
        let width = usize::from(w).max(1);
        for (y, cells) in output.cells.chunks_mut(width).enumerate() {
            let row = input.row(y as u32);
            if self.color {
                map_row_scalar::<true>(&self.charset, row, input.channels, cells);
            } else {
                map_row_scalar::<false>(&self.charset, row, input.channels, cells);
            }
        }
    }

    fn compose(&self, grid: &CharGrid, out: &mut String) {
        for row in grid.rows() {
            write_row(row, out);
        }
    }

    fn name(&self) -> &'static str {
        "scalar"
    }
}

/// Stratégie batched : luminance par ligne entière + LUT, lignes en parallèle.
///
/// Produces exactly the grid and text of [`ScalarProcessor`].
pub struct BatchedProcessor {
    charset: Charset,
    color: bool,
}

impl BatchedProcessor {
    /// Create a batched processor.
    #[must_use]
    pub fn new(charset: Charset, color: bool) -> Self {
        Self { charset, color }
    }
}

impl Processor for BatchedProcessor {
    fn process(&self, input: &Frame, output: &mut CharGrid) {
        let (w, h) = grid_dims(input);
        output.resize(w, h);
        let width = usize::from(w).max(1);
        let charset = &self.charset;
        let color = self.color;
        output
            .cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each_init(Vec::new, |lum, (y, cells)| {
                let row = input.row(y as u32);
                if color {
                    map_row_lut::<true>(charset, row, input.channels, lum, cells);
                } else {
                    map_row_lut::<false>(charset, row, input.channels, lum, cells);
                }
            });
    }

    fn compose(&self, grid: &CharGrid, out: &mut String) {
        let width = usize::from(grid.width).max(1);
        let rows: Vec<String> = grid
            .cells
            .par_chunks(width)
            .map(|row| {
                let mut line = String::with_capacity(row.len() * 20 + 1);
                write_row(row, &mut line);
                line
            })
            .collect();
        out.reserve(rows.iter().map(String::len).sum());
        for line in &rows {
            out.push_str(line);
        }
    }

    fn name(&self) -> &'static str {
        "batched"
    }
}

/// Compositor orchestre la conversion cellules → glyphes → texte.
///
/// Owns the per-cycle grid and text buffer; both are overwritten every frame.
///
/// # Example
/// ```
/// use tv_ascii::compositor::Compositor;
/// use tv_core::charset::Charset;
/// use tv_core::frame::{Channels, Frame};
///
/// let mut c = Compositor::new(Charset::new("t", " .:#@").unwrap(), false, true);
/// let cells = Frame::new(4, 2, Channels::Rgb);
/// assert_eq!(c.render(&cells), "    \n    \n");
/// ```
pub struct Compositor {
    processor: Box<dyn Processor>,
    grid: CharGrid,
    text: String,
}

impl Compositor {
    /// Create a compositor. `batched` selects [`BatchedProcessor`].
    #[must_use]
    pub fn new(charset: Charset, color: bool, batched: bool) -> Self {
        let processor: Box<dyn Processor> = if batched {
            Box::new(BatchedProcessor::new(charset, color))
        } else {
            Box::new(ScalarProcessor::new(charset, color))
        };
        log::debug!("Compositor: stratégie {}", processor.name());
        Self {
            processor,
            grid: CharGrid::new(0, 0),
            text: String::new(),
        }
    }

    /// Map `cells` (one pixel per cell) and compose the text block.
    pub fn render(&mut self, cells: &Frame) -> &str {
        self.processor.process(cells, &mut self.grid);
        self.text.clear();
        self.processor.compose(&self.grid, &mut self.text);
        &self.text
    }

    /// Grid produced by the last `render`.
    #[must_use]
    pub fn grid(&self) -> &CharGrid {
        &self.grid
    }

    /// Name of the active strategy.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        self.processor.name()
    }
}
