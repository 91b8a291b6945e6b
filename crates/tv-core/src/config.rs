use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::Charset;

/// Configuration d'une session de lecture.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use tv_core::config::PlaybackConfig;
/// let config = PlaybackConfig::default();
/// assert_eq!(config.width, 80);
/// assert!(config.color_enabled);
/// assert!(config.use_batched_path);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Chemin de la vidéo. Doit exister, sinon la lecture ne démarre pas.
    pub video_path: Option<PathBuf>,
    /// Largeur de la grille en colonnes.
    pub width: u16,
    /// FPS demandé. 0 = utiliser le débit annoncé par la source.
    pub fps_override: u32,
    /// Activer la couleur truecolor.
    pub color_enabled: bool,
    /// Rampe de caractères intégrée.
    pub charset_mode: CharsetMode,
    /// Rampe personnalisée (sombre → clair). Prioritaire sur `charset_mode`.
    pub custom_charset: Option<String>,
    /// Stratégie batched (LUT + rayon) plutôt que scalaire.
    pub use_batched_path: bool,
    /// Qui gagne quand la source et l'override annoncent tous deux un débit.
    pub fps_precedence: FpsPrecedence,
    /// Pause après la bannière de démarrage, en secondes.
    pub intro_delay_secs: f32,
    /// Arrêt normal après ce nombre de frames.
    pub max_frames: Option<u64>,
}

/// Built-in charset selection.
///
/// # Example
/// ```
/// use tv_core::config::CharsetMode;
/// assert!(matches!(CharsetMode::default(), CharsetMode::Ascii));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum CharsetMode {
    /// 69-glyph ASCII ramp.
    #[default]
    Ascii,
    /// Shade blocks `░▒▓█`.
    UnicodeBlocks,
    /// 10-glyph ASCII ramp.
    Compact,
}

/// Target-period precedence between the source rate and `fps_override`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum FpsPrecedence {
    /// Le débit de la source gagne, l'override sert de repli.
    #[default]
    Source,
    /// L'override gagne, le débit de la source sert de repli.
    Override,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            video_path: None,
            width: 80,
            fps_override: 0,
            color_enabled: true,
            charset_mode: CharsetMode::Ascii,
            custom_charset: None,
            use_batched_path: true,
            fps_precedence: FpsPrecedence::Source,
            intro_delay_secs: 2.0,
            max_frames: None,
        }
    }
}

impl PlaybackConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.width = self.width.clamp(1, 1000);
        self.fps_override = self.fps_override.min(240);
        self.intro_delay_secs = if self.intro_delay_secs.is_finite() {
            self.intro_delay_secs.clamp(0.0, 10.0)
        } else {
            0.0
        };
    }

    /// Charset sélectionné pour la session.
    ///
    /// A custom charset with fewer than 2 glyphs falls back to the mode's preset.
    ///
    /// # Example
    /// ```
    /// use tv_core::config::PlaybackConfig;
    /// let mut config = PlaybackConfig::default();
    /// config.custom_charset = Some(" #".into());
    /// assert_eq!(config.charset().len(), 2);
    /// ```
    #[must_use]
    pub fn charset(&self) -> Charset {
        if let Some(ref glyphs) = self.custom_charset {
            match Charset::new("custom", glyphs) {
                Ok(cs) => return cs,
                Err(e) => log::warn!("{e}, utilisation du preset {:?}", self.charset_mode),
            }
        }
        Charset::for_mode(self.charset_mode)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    playback: PlaybackSection,
}

/// Playback section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct PlaybackSection {
    video_path: Option<PathBuf>,
    width: Option<u16>,
    fps_override: Option<u32>,
    color_enabled: Option<bool>,
    charset_mode: Option<CharsetMode>,
    custom_charset: Option<String>,
    use_batched_path: Option<bool>,
    fps_precedence: Option<FpsPrecedence>,
    intro_delay_secs: Option<f32>,
    max_frames: Option<u64>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use tv_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PlaybackConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = PlaybackConfig::default();

    let p = file.playback;
    if let Some(v) = p.video_path {
        config.video_path = Some(v);
    }
    if let Some(v) = p.width {
        config.width = v;
    }
    if let Some(v) = p.fps_override {
        config.fps_override = v;
    }
    if let Some(v) = p.color_enabled {
        config.color_enabled = v;
    }
    if let Some(v) = p.charset_mode {
        config.charset_mode = v;
    }
    if let Some(v) = p.custom_charset {
        config.custom_charset = Some(v);
    }
    if let Some(v) = p.use_batched_path {
        config.use_batched_path = v;
    }
    if let Some(v) = p.fps_precedence {
        config.fps_precedence = v;
    }
    if let Some(v) = p.intro_delay_secs {
        config.intro_delay_secs = v;
    }
    if let Some(v) = p.max_frames {
        config.max_frames = Some(v);
    }

    config.clamp_all();
    Ok(config)
}
