use anyhow::{Context, Result};
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use tv_core::frame::{Channels, Frame};

/// Dimensions `(cols, rows)` de la grille pour une source `src_w × src_h`.
///
/// `rows = floor(src_h * cols / src_w / 2)`: terminal cells are roughly twice
/// as tall as wide. A zero row count is clamped to 1.
///
/// # Example
/// ```
/// use tv_source::resize::grid_geometry;
/// assert_eq!(grid_geometry(1920, 1080, 80), (80, 22));
/// assert_eq!(grid_geometry(1000, 10, 1), (1, 1));
/// ```
#[must_use]
pub fn grid_geometry(src_w: u32, src_h: u32, width: u16) -> (u16, u16) {
    let cols = width.max(1);
    let rows = u64::from(src_h) * u64::from(cols) / (u64::from(src_w.max(1)) * 2);
    let rows = if rows == 0 {
        log::debug!("grid_geometry: {src_w}x{src_h} → 0 ligne à {cols} colonnes, clamp à 1");
        1
    } else {
        rows.min(u64::from(u16::MAX)) as u16
    };
    (cols, rows)
}

fn pixel_type(channels: Channels) -> PixelType {
    match channels {
        Channels::Gray => PixelType::U8,
        Channels::Rgb => PixelType::U8x3,
    }
}

/// Réducteur réutilisable wrappant fast_image_resize.
///
/// Box convolution, i.e. area averaging when shrinking: every source pixel
/// contributes to its cell, which keeps high-frequency content from
/// flickering between frames.
///
/// # Example
/// ```
/// use tv_source::resize::Downscaler;
/// use tv_core::frame::{Channels, Frame};
/// let mut d = Downscaler::new();
/// let src = Frame::new(640, 360, Channels::Rgb);
/// let cells = d.downscale(&src, 80).unwrap();
/// assert_eq!((cells.width, cells.height), (80, 22));
/// ```
pub struct Downscaler {
    inner: FirResizer,
    options: ResizeOptions,
}

impl Downscaler {
    /// Create a new downscaler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box)),
        }
    }

    /// Reduce `src` to a grid `width` columns wide.
    ///
    /// Output keeps the source's channel layout, one pixel per cell.
    ///
    /// # Errors
    /// Returns an error if the frame has zero dimensions or the resize fails.
    pub fn downscale(&mut self, src: &Frame, width: u16) -> Result<Frame> {
        let (cols, rows) = grid_geometry(src.width, src.height, width);
        let mut dst = Frame::new(u32::from(cols), u32::from(rows), src.channels);
        self.resize_into(src, &mut dst)?;
        Ok(dst)
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the layouts differ or the resize operation fails.
    pub fn resize_into(&mut self, src: &Frame, dst: &mut Frame) -> Result<()> {
        anyhow::ensure!(
            src.channels == dst.channels,
            "Canaux incompatibles : {:?} → {:?}",
            src.channels,
            dst.channels
        );
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        let pixel_type = pixel_type(src.channels);
        let src_image = ImageRef::new(src.width, src.height, &src.data, pixel_type)
            .context("Invalid source dimensions")?;

        let mut dst_image = Image::from_slice_u8(dst.width, dst.height, &mut dst.data, pixel_type)
            .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for Downscaler {
    fn default() -> Self {
        Self::new()
    }
}
