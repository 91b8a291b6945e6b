use crate::config::CharsetMode;
use crate::error::CoreError;

/// 69 caractères, rampe ASCII détaillée, du plus sombre au plus clair.
pub const CHARSET_ASCII: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0Zmwqpdbkhao*#MW&8%B@$";

/// Blocs Unicode, pseudo-pixels.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// 10 caractères, compact, bon contraste.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// Index of a brightness level in a charset of `len` glyphs.
///
/// `floor(brightness * (len - 1) / 255)` in integer arithmetic, clamped to
/// `len - 1`. Every mapping path goes through this function.
///
/// # Example
/// ```
/// use tv_core::charset::glyph_index;
/// assert_eq!(glyph_index(0, 10), 0);
/// assert_eq!(glyph_index(255, 10), 9);
/// assert_eq!(glyph_index(128, 10), 4);
/// ```
#[inline(always)]
#[must_use]
pub fn glyph_index(brightness: u8, len: usize) -> usize {
    let top = len.saturating_sub(1);
    (usize::from(brightness) * top / 255).min(top)
}

/// Ordered glyph ramp, index 0 = darkest.
///
/// Holds both the glyph array and a 256-entry lookup table keyed by
/// brightness, pre-computed at startup for O(1) per-cell cost.
///
/// # Example
/// ```
/// use tv_core::charset::Charset;
/// let cs = Charset::new("custom", " .:#@").unwrap();
/// assert_eq!(cs.map(0), ' ');
/// assert_eq!(cs.map(255), '@');
/// assert_eq!(cs.glyph(2), ':');
/// ```
#[derive(Clone, Debug)]
pub struct Charset {
    name: String,
    glyphs: Vec<char>,
    lut: [char; 256],
}

impl Charset {
    /// Build a charset from a string ordered darkest→brightest.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if `glyphs` has fewer than 2 characters.
    pub fn new(name: &str, glyphs: &str) -> Result<Self, CoreError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.len() < 2 {
            return Err(CoreError::Config(format!(
                "le charset '{name}' doit contenir au moins 2 caractères"
            )));
        }
        let mut lut = [' '; 256];
        for (b, slot) in lut.iter_mut().enumerate() {
            *slot = glyphs[glyph_index(b as u8, glyphs.len())];
        }
        Ok(Self {
            name: name.to_string(),
            glyphs,
            lut,
        })
    }

    /// Built-in charset for a mode.
    ///
    /// # Example
    /// ```
    /// use tv_core::charset::Charset;
    /// use tv_core::config::CharsetMode;
    /// let cs = Charset::for_mode(CharsetMode::UnicodeBlocks);
    /// assert_eq!(cs.len(), 5);
    /// assert_eq!(cs.brightest(), '█');
    /// ```
    #[must_use]
    pub fn for_mode(mode: CharsetMode) -> Self {
        let (name, glyphs) = match mode {
            CharsetMode::Ascii => ("ASCII", CHARSET_ASCII),
            CharsetMode::UnicodeBlocks => ("Unicode blocks", CHARSET_BLOCKS),
            CharsetMode::Compact => ("Compact", CHARSET_COMPACT),
        };
        // Les presets ont tous >= 2 caractères.
        Self::new(name, glyphs).unwrap_or_else(|_| Self::fallback())
    }

    fn fallback() -> Self {
        let mut lut = [' '; 256];
        lut[128..].fill('@');
        Self {
            name: "fallback".to_string(),
            glyphs: vec![' ', '@'],
            lut,
        }
    }

    /// Human-readable name, shown in the startup banner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of glyphs `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false: a charset has at least 2 glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph at `index`, clamped to `N - 1`.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, index: usize) -> char {
        self.glyphs[index.min(self.glyphs.len() - 1)]
    }

    /// Map a brightness value [0..255] to a glyph through the LUT.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, brightness: u8) -> char {
        self.lut[brightness as usize]
    }

    /// Glyph for brightness 0.
    #[must_use]
    pub fn darkest(&self) -> char {
        self.glyphs[0]
    }

    /// Glyph for brightness 255.
    #[must_use]
    pub fn brightest(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }
}
