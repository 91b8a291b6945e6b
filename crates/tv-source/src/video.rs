// Décodage via ffmpeg en subprocess (std::process::Command).
// Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
// Architecture :
//   - `probe_video`       : interroge ffprobe pour obtenir width/height/fps
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → flux raw rgb24 à la taille sondée
//   - `FfmpegSource`      : lit une frame par appel, sans file d'attente

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tv_core::error::CoreError;
use tv_core::frame::{Channels, Frame};
use tv_core::traits::FrameSource;

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0). `0.0` si inconnu.
    pub fps: f64,
}

/// Parse la sortie `key=value` de ffprobe.
///
/// `r_frame_rate` arrive sous forme de fraction ("24/1", "30000/1001");
/// un dénominateur nul ("0/0") laisse le débit à `0.0`.
///
/// # Errors
/// Returns an error if no positive width/height was reported.
///
/// # Example
/// ```
/// use tv_source::video::parse_probe_output;
/// let info = parse_probe_output("width=640\nheight=360\nr_frame_rate=30000/1001\n").unwrap();
/// assert_eq!((info.width, info.height), (640, 360));
/// assert!((info.fps - 29.97).abs() < 0.01);
/// ```
pub fn parse_probe_output(text: &str) -> Result<VideoInfo> {
    let mut width: u32 = 0;
    let mut height: u32 = 0;
    let mut fps: f64 = 0.0;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 && num.is_finite() {
                fps = (num / den).max(0.0);
            }
        }
    }

    if width == 0 || height == 0 {
        anyhow::bail!("ffprobe n'a trouvé aucun flux vidéo ({width}x{height})");
    }
    Ok(VideoInfo { width, height, fps })
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier
/// ne contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context(
            "Impossible de lancer ffprobe. Vérifiez que ffprobe est installé et dans le PATH.",
        )?;

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("Probe de {} échoué", path.display()))?;

    log::info!(
        "probe_video: {}x{} @ {:.3}fps ({})",
        info.width,
        info.height,
        info.fps,
        path.display()
    );
    Ok(info)
}

/// Arguments ffmpeg pour un flux rgb24 brut à la taille sondée.
///
/// The `scale` filter pins every frame to `info.width × info.height`, so a
/// stream ffmpeg auto-rotates still matches the stride `Frame` expects.
///
/// # Example
/// ```
/// use tv_source::video::{VideoInfo, ffmpeg_args};
/// let info = VideoInfo { width: 1920, height: 1080, fps: 30.0 };
/// let args = ffmpeg_args("clip.mp4", info);
/// assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=1920:1080"));
/// ```
#[must_use]
pub fn ffmpeg_args(path_str: &str, info: VideoInfo) -> Vec<String> {
    let scale_filter = format!("scale={}:{}", info.width, info.height);
    [
        "-i",
        path_str, // fichier source
        "-vf",
        scale_filter.as_str(), // taille figée sur le probe
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24", // 3 bytes/pixel
        "-an",   // pas d'audio
        "-hide_banner",
        "-loglevel",
        "error",
        "pipe:1", // stdout
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Lance un processus `ffmpeg` qui écrit des frames RGB brutes sur stdout.
///
/// Chaque frame = `w × h × 3` bytes (rgb24 row-major, sans padding), à la
/// résolution sondée : la réduction est faite par le `Downscaler`.
///
/// # Errors
/// Returns an error if the process cannot be spawned.
pub fn spawn_ffmpeg_pipe(path: &Path, info: VideoInfo) -> Result<Child> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let child = Command::new("ffmpeg")
        .args(ffmpeg_args(path_str, info))
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez qu'il est installé et dans le PATH.")?;

    log::debug!(
        "ffmpeg spawné pour {} ({}x{})",
        path.display(),
        info.width,
        info.height
    );
    Ok(child)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false), // EOF
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Source vidéo adossée à un subprocess ffmpeg.
///
/// Aucune lecture anticipée : `next_frame` bloque le temps de lire une frame.
/// `release` tue et récolte le processus ; idempotent, aussi appelé au `Drop`.
///
/// # Example
/// ```no_run
/// use tv_source::video::FfmpegSource;
/// use tv_core::traits::FrameSource;
/// use std::path::Path;
/// let mut source = FfmpegSource::open(Path::new("video.mp4")).unwrap();
/// while let Some(frame) = source.next_frame().unwrap() {
///     let _ = frame.width;
/// }
/// source.release();
/// ```
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
    child: Option<Child>,
}

impl FfmpegSource {
    /// Ouvre `path` : vérifie son existence, probe, puis lance ffmpeg.
    ///
    /// # Errors
    /// [`CoreError::SourceNotFound`] si le chemin n'existe pas ; sinon toute
    /// erreur de probe ou de spawn.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::SourceNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let info = probe_video(path)?;
        let child = spawn_ffmpeg_pipe(path, info)?;
        Ok(Self {
            path: path.to_path_buf(),
            info,
            child: Some(child),
        })
    }

    /// Métadonnées du flux.
    #[must_use]
    pub fn info(&self) -> VideoInfo {
        self.info
    }
}

impl FrameSource for FfmpegSource {
    fn nominal_fps(&self) -> f64 {
        self.info.fps
    }

    fn native_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(stdout) = self.child.as_mut().and_then(|c| c.stdout.as_mut()) else {
            return Ok(None);
        };
        let mut frame = Frame::new(self.info.width, self.info.height, Channels::Rgb);
        let complete = read_exact_or_eof(stdout, &mut frame.data)
            .with_context(|| format!("Lecture du pipe ffmpeg ({})", self.path.display()))?;
        if complete {
            Ok(Some(frame))
        } else {
            log::info!("Source: EOF sur {}", self.path.display());
            Ok(None)
        }
    }

    fn release(&mut self) {
        if let Some(mut c) = self.child.take() {
            if let Err(e) = c.kill() {
                log::debug!("ffmpeg déjà terminé : {e}");
            }
            if let Err(e) = c.wait() {
                log::warn!("Impossible de récolter ffmpeg : {e}");
            }
            log::info!("Source libérée : {}", self.path.display());
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn missing_path_is_source_not_found() {
        let Err(err) = FfmpegSource::open(Path::new("/nonexistent/clip.mp4")) else {
            panic!("open aurait dû échouer");
        };
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn probe_zero_rate_is_unknown() {
        let info = parse_probe_output("width=320\nheight=240\nr_frame_rate=0/0\n").unwrap();
        assert!(info.fps.abs() < f64::EPSILON);
    }

    #[test]
    fn probe_integer_rate() {
        let info = parse_probe_output("width=320\nheight=240\nr_frame_rate=25/1").unwrap();
        assert!((info.fps - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_without_stream_is_an_error() {
        assert!(parse_probe_output("").is_err());
        assert!(parse_probe_output("width=0\nheight=240\n").is_err());
    }

    #[test]
    fn pipe_size_is_pinned_to_probe() {
        // Portrait clip with rotation metadata: ffprobe reports the coded size.
        let info = VideoInfo {
            width: 1920,
            height: 1080,
            fps: 30.0,
        };
        let args = ffmpeg_args("phone.mp4", info);
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=1920:1080");
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(input < vf);
        assert_eq!(args[input + 1], "phone.mp4");
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
        let fmt = args.iter().position(|a| a == "-pix_fmt").unwrap();
        assert_eq!(args[fmt + 1], "rgb24");
    }

    #[test]
    fn read_exact_reports_eof_on_short_input() {
        let mut reader = Cursor::new(vec![1u8; 5]);
        let mut buf = [0u8; 8];
        assert!(!read_exact_or_eof(&mut reader, &mut buf).unwrap());
    }

    #[test]
    fn read_exact_fills_buffer() {
        let mut reader = Cursor::new((0u8..16).collect::<Vec<_>>());
        let mut buf = [0u8; 8];
        assert!(read_exact_or_eof(&mut reader, &mut buf).unwrap());
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(read_exact_or_eof(&mut reader, &mut buf).unwrap());
        assert!(!read_exact_or_eof(&mut reader, &mut buf).unwrap());
    }
}
