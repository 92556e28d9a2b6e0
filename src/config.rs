use crate::error::DetectError;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "textline-detect")]
#[command(about = "Text line detection with a DBNet-style segmentation model")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP detection server
    Serve(ServeArgs),
    /// Detect text lines in a single image and print them as JSON
    Detect(DetectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "DETECT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DETECT_PORT", default_value = "9393")]
    pub port: u16,

    /// Maximum file size in bytes (default: 50MB)
    #[arg(long, env = "DETECT_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Path to the detection model
    #[arg(long, env = "DETECT_MODEL_PATH", default_value = "models/det_model.rten")]
    pub model_path: PathBuf,

    #[command(flatten)]
    pub detection: DetectionOverrides,
}

#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Image to analyze
    pub image: PathBuf,

    /// Path to the detection model
    #[arg(long, env = "DETECT_MODEL_PATH", default_value = "models/det_model.rten")]
    pub model_path: PathBuf,

    /// Write a copy of the image with the detected lines drawn on it
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    #[command(flatten)]
    pub detection: DetectionOverrides,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub model_path: PathBuf,
    pub detection: DetectionConfig,
}

impl TryFrom<ServeArgs> for Config {
    type Error = DetectError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let detection = DetectionConfig::default().with_overrides(&args.detection)?;
        Ok(Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            model_path: args.model_path,
            detection,
        })
    }
}

/// Tunables of the detection pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionConfig {
    /// Longest side after resizing; smaller images are not upscaled
    pub max_side: u32,
    /// Padded tensor dimensions are multiples of this
    pub alignment: u32,
    /// Probability at or above which a pixel counts as text
    pub threshold: f32,
    pub min_box_width: u32,
    pub min_box_height: u32,
    /// Vertical tolerance as a fraction of the average box height
    pub merge_tol_factor: f64,
    /// Outward padding applied to every merged line
    pub merge_padding: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_side: 960,
            alignment: 32,
            threshold: 0.3,
            min_box_width: 5,
            min_box_height: 5,
            merge_tol_factor: 0.15,
            merge_padding: 4,
        }
    }
}

/// Largest accepted `max_side`
pub const MAX_SIDE_LIMIT: u32 = 4096;
/// Largest accepted `alignment`
pub const MAX_ALIGNMENT: u32 = 256;
/// Largest accepted `merge_padding`
pub const MAX_MERGE_PADDING: u32 = 1024;

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.max_side == 0 || self.max_side > MAX_SIDE_LIMIT {
            return Err(DetectError::InvalidInput(format!(
                "max_side must be in 1..={}, got {}",
                MAX_SIDE_LIMIT, self.max_side
            )));
        }
        if self.alignment == 0 || self.alignment > MAX_ALIGNMENT {
            return Err(DetectError::InvalidInput(format!(
                "alignment must be in 1..={}, got {}",
                MAX_ALIGNMENT, self.alignment
            )));
        }
        if self.merge_padding > MAX_MERGE_PADDING {
            return Err(DetectError::InvalidInput(format!(
                "merge_padding must be at most {}, got {}",
                MAX_MERGE_PADDING, self.merge_padding
            )));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(DetectError::InvalidInput(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if !(self.merge_tol_factor > 0.0 && self.merge_tol_factor.is_finite()) {
            return Err(DetectError::InvalidInput(format!(
                "merge_tol_factor must be positive, got {}",
                self.merge_tol_factor
            )));
        }
        Ok(())
    }

    /// Apply every override that is set and validate the result
    pub fn with_overrides(mut self, overrides: &DetectionOverrides) -> Result<Self, DetectError> {
        if let Some(v) = overrides.max_side {
            self.max_side = v;
        }
        if let Some(v) = overrides.alignment {
            self.alignment = v;
        }
        if let Some(v) = overrides.threshold {
            self.threshold = v;
        }
        if let Some(v) = overrides.min_box_width {
            self.min_box_width = v;
        }
        if let Some(v) = overrides.min_box_height {
            self.min_box_height = v;
        }
        if let Some(v) = overrides.merge_tol_factor {
            self.merge_tol_factor = v;
        }
        if let Some(v) = overrides.merge_padding {
            self.merge_padding = v;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Optional per-field overrides, from the command line or a request query string
#[derive(clap::Args, Debug, Clone, Default, Deserialize)]
pub struct DetectionOverrides {
    /// Longest side after resizing [default: 960]
    #[arg(long)]
    pub max_side: Option<u32>,

    /// Tensor dimension alignment [default: 32]
    #[arg(long)]
    pub alignment: Option<u32>,

    /// Text probability threshold [default: 0.3]
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Minimum candidate width in map pixels [default: 5]
    #[arg(long)]
    pub min_box_width: Option<u32>,

    /// Minimum candidate height in map pixels [default: 5]
    #[arg(long)]
    pub min_box_height: Option<u32>,

    /// Line grouping tolerance factor [default: 0.15]
    #[arg(long)]
    pub merge_tol_factor: Option<f64>,

    /// Padding added around merged lines [default: 4]
    #[arg(long)]
    pub merge_padding: Option<u32>,
}
