//! Playback geometry derived from the first video stream of an upload.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Absolute tolerance when comparing an aspect ratio against 16:9 or 9:16.
///
/// Fixed epsilon, not proportional: existing stored keys were classified with it.
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.01;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Orientation class, also used as the first segment of a stored object's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify stream geometry: 16:9 is landscape, 9:16 is portrait, anything else is other.
    pub fn classify(width: u32, height: u32) -> Self {
        if height == 0 {
            return Orientation::Other;
        }
        let ratio = f64::from(width) / f64::from(height);
        if (ratio - LANDSCAPE_RATIO).abs() < ASPECT_RATIO_TOLERANCE {
            Orientation::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() < ASPECT_RATIO_TOLERANCE {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "other" => Ok(Orientation::Other),
            _ => Err(anyhow::anyhow!("Invalid orientation: {}", s)),
        }
    }
}

/// Width, height and orientation of an upload. Computed once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaProfile {
    width: u32,
    height: u32,
    orientation: Orientation,
}

impl MediaProfile {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            orientation: Orientation::classify(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}
