use tv_core::charset::{Charset, glyph_index};
use tv_core::frame::{Channels, Glyph};

use crate::color_map;

/// Luminance perceptuelle BT.601, `floor(0.299r + 0.587g + 0.114b)`.
///
/// Integer arithmetic: the weights sum to exactly 1000, so white stays 255
/// and there is no float rounding to disagree between paths.
///
/// # Example
/// ```
/// use tv_ascii::luminance::brightness;
/// assert_eq!(brightness(255, 255, 255), 255);
/// assert_eq!(brightness(0, 0, 0), 0);
/// assert_eq!(brightness(255, 0, 0), 76);
/// ```
#[inline(always)]
#[must_use]
pub fn brightness(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

/// Brightness of one cell's raw bytes. Gray cells are used directly.
#[inline(always)]
#[must_use]
pub fn cell_brightness(px: &[u8], channels: Channels) -> u8 {
    match channels {
        Channels::Gray => px[0],
        Channels::Rgb => brightness(px[0], px[1], px[2]),
    }
}

/// Index d'un pixel dans le charset : brightness puis `glyph_index`.
///
/// # Example
/// ```
/// use tv_ascii::luminance::map_index;
/// use tv_core::frame::Channels;
/// assert_eq!(map_index(&[255, 255, 255], Channels::Rgb, 10), 9);
/// assert_eq!(map_index(&[0], Channels::Gray, 10), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn map_index(px: &[u8], channels: Channels, charset_len: usize) -> usize {
    glyph_index(cell_brightness(px, channels), charset_len)
}

/// Chemin scalaire : un pixel à la fois, brightness → index → glyph.
///
/// `COLOR = false` compiles the color tagging out entirely.
pub fn map_row_scalar<const COLOR: bool>(
    charset: &Charset,
    row: &[u8],
    channels: Channels,
    out: &mut [Glyph],
) {
    let n = channels.count();
    for (px, cell) in row.chunks_exact(n).zip(out.iter_mut()) {
        let idx = map_index(px, channels, charset.len());
        *cell = Glyph {
            ch: charset.glyph(idx),
            color: if COLOR {
                Some(color_map::encode(px, channels))
            } else {
                None
            },
        };
    }
}

/// Chemin batched : luminance de toute la ligne dans `lum`, puis LUT.
///
/// `lum` is caller-owned scratch, reused across rows.
pub fn map_row_lut<const COLOR: bool>(
    charset: &Charset,
    row: &[u8],
    channels: Channels,
    lum: &mut Vec<u8>,
    out: &mut [Glyph],
) {
    let n = channels.count();
    lum.clear();
    match channels {
        Channels::Gray => lum.extend_from_slice(row),
        Channels::Rgb => lum.extend(row.chunks_exact(3).map(|p| brightness(p[0], p[1], p[2]))),
    }
    for ((&b, px), cell) in lum.iter().zip(row.chunks_exact(n)).zip(out.iter_mut()) {
        cell.ch = charset.map(b);
        cell.color = if COLOR {
            Some(color_map::encode(px, channels))
        } else {
            None
        };
    }
}
