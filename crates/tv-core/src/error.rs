use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// The configured video path does not resolve to an openable resource.
    #[error("Vidéo introuvable : {path}")]
    SourceNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Pixel buffer length does not match `width × height × channels`.
    #[error("Taille de buffer invalide : {actual} octets, {expected} attendus")]
    BufferSize {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
}
