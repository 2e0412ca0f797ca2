//! Tubely Processing Library
//!
//! Wraps the external media tools used during ingestion: `ffprobe` for stream
//! geometry and `ffmpeg` for the fast-start container rewrite. Both run as
//! subprocesses behind a shared [`ToolRunner`], which enforces a timeout and
//! caps how many tools run at once through the [`ProcessingGate`].

pub mod command;
pub mod error;
pub mod gate;
pub mod video;

pub use command::ToolRunner;
pub use error::{ProcessingError, ProcessingResult};
pub use gate::ProcessingGate;
pub use video::{
    fast_start_output_path, parse_probe_output, ContainerOptimizer, FfmpegFastStart,
    FfprobeInspector, MediaInspector,
};
