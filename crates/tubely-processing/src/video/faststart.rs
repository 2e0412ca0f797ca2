//! Fast-start container rewrite via ffmpeg.
//!
//! Streams are copied unchanged; only the `moov` index is moved ahead of the
//! sample data so playback can start before the download completes.

use crate::command::{stderr_tail, validate_tool_path, ToolRunner};
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix appended to the input path to name the rewritten file.
pub const PROCESSING_SUFFIX: &str = ".processing";

#[async_trait]
pub trait ContainerOptimizer: Send + Sync {
    /// Write a fast-start copy of `input` and return its path. `input` is left untouched.
    async fn optimize(&self, input: &Path) -> ProcessingResult<PathBuf>;
}

/// `<input>.processing`, next to the input.
pub fn fast_start_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

pub struct FfmpegFastStart {
    ffmpeg_path: String,
    runner: ToolRunner,
}

impl FfmpegFastStart {
    pub fn new(ffmpeg_path: String, runner: ToolRunner) -> ProcessingResult<Self> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self {
            ffmpeg_path,
            runner,
        })
    }
}

#[async_trait]
impl ContainerOptimizer for FfmpegFastStart {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn optimize(&self, input: &Path) -> ProcessingResult<PathBuf> {
        let output_path = fast_start_output_path(input);
        let start = std::time::Instant::now();

        let output = self
            .runner
            .run(
                &self.ffmpeg_path,
                [
                    OsStr::new("-i"),
                    input.as_os_str(),
                    OsStr::new("-c"),
                    OsStr::new("copy"),
                    OsStr::new("-movflags"),
                    OsStr::new("faststart"),
                    OsStr::new("-f"),
                    OsStr::new("mp4"),
                    output_path.as_os_str(),
                ],
            )
            .await
            .map_err(|f| f.into_processing_error("ffmpeg", ProcessingError::Transcode))?;

        if !output.status.success() {
            return Err(ProcessingError::Transcode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr_tail(&output)
            )));
        }

        let written = tokio::fs::metadata(&output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(ProcessingError::Transcode(
                "ffmpeg produced no output file".to_string(),
            ));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output_bytes = written,
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
