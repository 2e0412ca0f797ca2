//! Stream geometry extraction via ffprobe.

use crate::command::{stderr_tail, validate_tool_path, ToolRunner};
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use tubely_core::MediaProfile;

/// Reads width/height of the first video stream and classifies orientation.
///
/// Read-only; calling it repeatedly on the same file is safe.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> ProcessingResult<MediaProfile>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output into a profile.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<MediaProfile> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Analysis(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ProcessingError::Analysis("No video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(MediaProfile::new(width, height)),
        _ => Err(ProcessingError::Analysis(
            "Video stream has no dimensions".to_string(),
        )),
    }
}

pub struct FfprobeInspector {
    ffprobe_path: String,
    runner: ToolRunner,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String, runner: ToolRunner) -> ProcessingResult<Self> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self {
            ffprobe_path,
            runner,
        })
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn inspect(&self, path: &Path) -> ProcessingResult<MediaProfile> {
        let start = std::time::Instant::now();

        let output = self
            .runner
            .run(
                &self.ffprobe_path,
                [
                    OsStr::new("-v"),
                    OsStr::new("error"),
                    OsStr::new("-print_format"),
                    OsStr::new("json"),
                    OsStr::new("-show_streams"),
                    OsStr::new("-select_streams"),
                    OsStr::new("v:0"),
                    path.as_os_str(),
                ],
            )
            .await
            .map_err(|f| f.into_processing_error("ffprobe", ProcessingError::Analysis))?;

        if !output.status.success() {
            return Err(ProcessingError::Analysis(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr_tail(&output)
            )));
        }

        let profile = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = profile.width(),
            height = profile.height(),
            orientation = %profile.orientation(),
            "Video probe completed"
        );

        Ok(profile)
    }
}
