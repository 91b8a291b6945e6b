pub mod color_map;
pub mod compositor;
/// Glyph conversion engine for termvid.
///
/// Converts downscaled pixel frames to character grids and text blocks.
pub mod luminance;

pub use compositor::{BatchedProcessor, Compositor, ScalarProcessor};
