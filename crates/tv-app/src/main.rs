use anyhow::{Context, Result};
use clap::Parser;
use tv_core::clock::{CancelToken, SystemClock};
use tv_core::config::PlaybackConfig;
use tv_render::terminal::CrosstermSink;
use tv_source::video::FfmpegSource;

pub mod cli;
pub mod session;

use session::{PlaybackSession, SessionSettings};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply(&mut config);

    let path = config
        .video_path
        .clone()
        .context("Aucune vidéo spécifiée (argument positionnel ou video_path dans la config)")?;

    // 4. Ctrl+C → annulation coopérative
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Impossible d'installer le handler Ctrl+C")?;

    // 5. Ouvrir la source (échoue avant toute boucle si le fichier manque)
    let source = FfmpegSource::open(&path)?;
    log::info!("Vidéo ouverte : {} ({:?})", path.display(), source.info());

    // 6. Lecture
    let mut sink = CrosstermSink::stdout();
    sink.hide_cursor()?;
    let session = PlaybackSession::new(
        source,
        sink,
        SystemClock,
        SessionSettings::from_config(&config),
        cancel,
    );
    let (mut sink, result) = session.run();

    // 7. Restaurer le curseur (TOUJOURS, même en cas d'erreur)
    if let Err(e) = sink.show_cursor() {
        log::warn!("Curseur non restauré : {e}");
    }

    let summary = result?;
    log::info!(
        "Arrêt {:?} : {} frames, moyenne {:?}, {} en retard",
        summary.stop,
        summary.frames,
        summary.average_processing,
        summary.lag_events
    );
    Ok(())
}

/// Config file if present, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<PlaybackConfig> {
    if cli.config.exists() {
        tv_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let cli = cli::Cli::parse_from(["termvid", "--config", "/nonexistent/termvid.toml"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.width, 80);
    }

    #[test]
    fn cli_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[playback]\nwidth = 60\nfps_override = 15\n")
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let cli = cli::Cli::parse_from(["termvid", "--config", &path, "--width", "100"]);
        let mut config = resolve_config(&cli).unwrap();
        cli.apply(&mut config);
        assert_eq!(config.width, 100);
        assert_eq!(config.fps_override, 15);
    }

    #[test]
    fn missing_video_is_reported_before_playback() {
        let err = FfmpegSource::open(std::path::Path::new("/nonexistent/clip.mp4"))
            .err()
            .unwrap();
        let core = err.downcast_ref::<tv_core::error::CoreError>().unwrap();
        assert!(matches!(core, tv_core::error::CoreError::SourceNotFound { .. }));
    }
}
