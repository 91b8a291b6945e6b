use crate::error::CoreError;

/// Pixel layout of a [`Frame`].
///
/// # Example
/// ```
/// use tv_core::frame::Channels;
/// assert_eq!(Channels::Rgb.count(), 3);
/// assert_eq!(Channels::Gray.count(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One byte per pixel, used directly as brightness.
    Gray,
    /// Three bytes per pixel, R then G then B.
    Rgb,
}

impl Channels {
    /// Bytes per pixel.
    #[inline(always)]
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

/// Frame décodée, immuable une fois produite.
///
/// Pixels row-major, `channels.count()` bytes par pixel, sans padding.
///
/// # Example
/// ```
/// use tv_core::frame::{Channels, Frame};
/// let f = Frame::new(10, 4, Channels::Rgb);
/// assert_eq!(f.data.len(), 10 * 4 * 3);
/// ```
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixels, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub channels: Channels,
}

impl Frame {
    /// Crée une frame noire aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32, channels: Channels) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * channels.count()],
            width,
            height,
            channels,
        }
    }

    /// Wrap an existing pixel buffer, checking its geometry.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] for a zero-sized frame and
    /// [`CoreError::BufferSize`] when `data` has the wrong length.
    ///
    /// # Example
    /// ```
    /// use tv_core::frame::{Channels, Frame};
    /// assert!(Frame::from_raw(2, 2, Channels::Gray, vec![0; 4]).is_ok());
    /// assert!(Frame::from_raw(2, 2, Channels::Rgb, vec![0; 4]).is_err());
    /// assert!(Frame::from_raw(0, 2, Channels::Gray, vec![]).is_err());
    /// ```
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Frame unie, pratique pour les tests et les mires.
    ///
    /// # Example
    /// ```
    /// use tv_core::frame::{Channels, Frame};
    /// let f = Frame::solid(3, 2, Channels::Rgb, (255, 0, 0));
    /// assert_eq!(&f.row(1)[6..9], &[255, 0, 0]);
    /// ```
    #[must_use]
    pub fn solid(width: u32, height: u32, channels: Channels, rgb: (u8, u8, u8)) -> Self {
        let mut frame = Self::new(width, height, channels);
        match channels {
            Channels::Gray => frame.data.fill(rgb.0),
            Channels::Rgb => {
                for px in frame.data.chunks_exact_mut(3) {
                    px.copy_from_slice(&[rgb.0, rgb.1, rgb.2]);
                }
            }
        }
        frame
    }

    /// Raw bytes of row `y`.
    #[inline(always)]
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * self.channels.count();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }
}

/// One grid cell: a display character and, in color mode, its RGB tag.
///
/// # Example
/// ```
/// use tv_core::frame::Glyph;
/// let g = Glyph::default();
/// assert_eq!(g.ch, ' ');
/// assert!(g.color.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur foreground, présente ssi le mode couleur est actif.
    pub color: Option<(u8, u8, u8)>,
}

impl Default for Glyph {
    fn default() -> Self {
        Self { ch: ' ', color: None }
    }
}

/// Grille de sortie, `height` lignes × `width` colonnes.
///
/// # Example
/// ```
/// use tv_core::frame::{CharGrid, Glyph};
/// let grid = CharGrid::new(80, 24);
/// assert_eq!(grid.cells.len(), 80 * 24);
/// assert!(grid.cells.iter().all(|g| *g == Glyph::default()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<Glyph>,
    /// Width in characters (columns).
    pub width: u16,
    /// Height in characters (rows).
    pub height: u16,
}

impl CharGrid {
    /// Crée une grille remplie d'espaces.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Glyph::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Iterate rows left-to-right, top-to-bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Glyph]> {
        self.cells.chunks(usize::from(self.width).max(1))
    }

    /// Reshape to new dimensions, reusing the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.cells
                .resize(width as usize * height as usize, Glyph::default());
        }
    }
}
