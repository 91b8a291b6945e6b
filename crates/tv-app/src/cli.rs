use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tv_core::config::{CharsetMode, FpsPrecedence, PlaybackConfig};

/// termvid : lecture vidéo en art ASCII dans le terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Chemin vers la vidéo.
    pub video: Option<PathBuf>,

    /// Largeur en colonnes (défaut : 80).
    #[arg(short, long)]
    pub width: Option<u16>,

    /// FPS demandé. 0 = débit annoncé par la vidéo.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Désactiver la couleur.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Rampe de caractères.
    #[arg(long, value_enum)]
    pub charset: Option<CharsetArg>,

    /// Utiliser le chemin scalaire au lieu du chemin batched.
    #[arg(long, default_value_t = false)]
    pub scalar: bool,

    /// `--fps` gagne sur le débit annoncé par la vidéo.
    #[arg(long, default_value_t = false)]
    pub prefer_override_fps: bool,

    /// S'arrêter après N frames.
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Pause après la bannière, en secondes.
    #[arg(long)]
    pub intro_delay: Option<f32>,

    /// Fichier de configuration TOML.
    #[arg(short, long, default_value = "config/termvid.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Charset names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CharsetArg {
    Ascii,
    Blocks,
    Compact,
}

impl From<CharsetArg> for CharsetMode {
    fn from(arg: CharsetArg) -> Self {
        match arg {
            CharsetArg::Ascii => Self::Ascii,
            CharsetArg::Blocks => Self::UnicodeBlocks,
            CharsetArg::Compact => Self::Compact,
        }
    }
}

impl Cli {
    /// Apply CLI overrides on top of the file/default config.
    pub fn apply(&self, config: &mut PlaybackConfig) {
        if let Some(ref path) = self.video {
            config.video_path = Some(path.clone());
        }
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(fps) = self.fps {
            config.fps_override = fps;
        }
        if self.no_color {
            config.color_enabled = false;
        }
        if let Some(cs) = self.charset {
            config.charset_mode = cs.into();
            config.custom_charset = None;
        }
        if self.scalar {
            config.use_batched_path = false;
        }
        if self.prefer_override_fps {
            config.fps_precedence = FpsPrecedence::Override;
        }
        if let Some(n) = self.max_frames {
            config.max_frames = Some(n);
        }
        if let Some(d) = self.intro_delay {
            config.intro_delay_secs = d;
        }
        config.clamp_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["termvid", "clip.mp4"]);
        let mut config = PlaybackConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.video_path, Some(PathBuf::from("clip.mp4")));
        assert_eq!(config.width, 80);
        assert!(config.color_enabled);
        assert!(config.use_batched_path);
        assert_eq!(config.fps_precedence, FpsPrecedence::Source);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "termvid",
            "clip.mp4",
            "--width",
            "120",
            "--fps",
            "12",
            "--no-color",
            "--charset",
            "blocks",
            "--scalar",
            "--prefer-override-fps",
            "--max-frames",
            "30",
        ]);
        let mut config = PlaybackConfig {
            custom_charset: Some("ab".into()),
            ..PlaybackConfig::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.width, 120);
        assert_eq!(config.fps_override, 12);
        assert!(!config.color_enabled);
        assert_eq!(config.charset_mode, CharsetMode::UnicodeBlocks);
        assert!(config.custom_charset.is_none());
        assert!(!config.use_batched_path);
        assert_eq!(config.fps_precedence, FpsPrecedence::Override);
        assert_eq!(config.max_frames, Some(30));
    }

    #[test]
    fn zero_width_is_clamped() {
        let cli = Cli::parse_from(["termvid", "-w", "0"]);
        let mut config = PlaybackConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.width, 1);
    }
}
