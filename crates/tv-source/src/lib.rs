/// Frame acquisition and downscaling for termvid.

pub mod resize;
pub mod video;
