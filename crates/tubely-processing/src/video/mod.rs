//! Video processing module

pub mod faststart;
pub mod probe;

pub use faststart::{fast_start_output_path, ContainerOptimizer, FfmpegFastStart, PROCESSING_SUFFIX};
pub use probe::{parse_probe_output, FfprobeInspector, MediaInspector};
