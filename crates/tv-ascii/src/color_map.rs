use std::fmt::Write;

use tv_core::frame::Channels;

/// Remet les attributs terminal à zéro.
pub const RESET: &str = "\x1b[0m";

/// Couleur d'une cellule, lue sur les mêmes octets que sa luminance.
///
/// Gray cells become a neutral `(v, v, v)` triplet.
///
/// # Example
/// ```
/// use tv_ascii::color_map::encode;
/// use tv_core::frame::Channels;
/// assert_eq!(encode(&[200, 50, 50], Channels::Rgb), (200, 50, 50));
/// assert_eq!(encode(&[90], Channels::Gray), (90, 90, 90));
/// ```
#[inline(always)]
#[must_use]
pub fn encode(px: &[u8], channels: Channels) -> (u8, u8, u8) {
    match channels {
        Channels::Gray => (px[0], px[0], px[0]),
        Channels::Rgb => (px[0], px[1], px[2]),
    }
}

/// Append the 24-bit foreground tag `ESC[38;2;R;G;Bm`.
///
/// # Example
/// ```
/// use tv_ascii::color_map::write_tag;
/// let mut s = String::new();
/// write_tag(&mut s, (255, 0, 12));
/// assert_eq!(s, "\x1b[38;2;255;0;12m");
/// ```
#[inline]
pub fn write_tag(out: &mut String, (r, g, b): (u8, u8, u8)) {
    // fmt::Write sur String ne peut pas échouer.
    let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
}
