//! Error types for the icon and resource compilation steps

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the icon building step
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Invalid icon size {0}: sizes must be positive")]
    InvalidSize(i64),

    #[error("No icon sizes requested")]
    NoSizes,

    #[error("Failed to decode source image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {size}x{size} frame")]
    Encode {
        size: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write icon file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Icon size {size} exceeds the maximum of {max}")]
    SizeTooLarge { size: i64, max: u32 },

    #[error("Too many frames for one icon: {0}")]
    TooManyFrames(usize),

    #[error("Icon data too large for the ICO format: {0} bytes")]
    ContainerTooLarge(usize),
}

/// Malformed ICO data
#[derive(Debug, Error)]
pub enum IcoFormatError {
    #[error("Data truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Bad ICO header: reserved={reserved}, type={kind}")]
    BadHeader { reserved: u16, kind: u16 },

    #[error("Frame {index} points outside the file (offset {offset}, length {length})")]
    FrameOutOfBounds { index: usize, offset: u32, length: u32 },

    #[error("Frame {index} has an unreadable PNG header")]
    BadFrame {
        index: usize,
        #[source]
        source: image::ImageError,
    },
}

/// Failures of the external resource compiler
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Resource compiler `{program}` not found")]
    ToolNotFound { program: String },

    #[error("Failed to start resource compiler `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Resource compiler `{program}` failed ({}):\n{}",
        describe_code(.code),
        String::from_utf8_lossy(.stderr)
    )]
    ToolFailed {
        program: String,
        code: Option<i32>,
        /// Raw bytes the tool wrote to its error stream
        stderr: Vec<u8>,
    },

    #[error("Failed to prepare output directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    /// Exit code reported by the external tool, if it ran and returned one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CompileError::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }

    /// Unmodified error stream of a failed tool run
    pub fn stderr(&self) -> Option<&[u8]> {
        match self {
            CompileError::ToolFailed { stderr, .. } => Some(stderr.as_slice()),
            _ => None,
        }
    }

    /// First line of the failure message, without the tool's own output
    pub fn headline(&self) -> String {
        match self {
            CompileError::ToolFailed { program, code, .. } => {
                format!("Resource compiler `{}` failed ({})", program, describe_code(code))
            }
            other => other.to_string(),
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

/// Either step of the pipeline failed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Icon(#[from] IconError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Configuration loading and saving failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("Config I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
