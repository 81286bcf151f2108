//! Resource compiler invocation
//!
//! The external tool sits behind the [`ResourceCompiler`] trait so the
//! pipeline can run against a fake in tests. [`Windres`] is the real
//! adapter: it runs `windres <script> [-I dir].. -O <format> -o <output>`
//! and waits for it to exit.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Object format the compiler should emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// COFF object, linkable directly
    #[default]
    Coff,
    /// Raw `.res` resource file
    Res,
}

impl OutputFormat {
    pub fn as_arg(self) -> &'static str {
        match self {
            OutputFormat::Coff => "coff",
            OutputFormat::Res => "res",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// One compilation of a resource script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub script: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub include_dirs: Vec<PathBuf>,
}

/// Text the tool printed on a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Anything that can turn a resource script into an object file
pub trait ResourceCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, CompileError>;
}

/// GNU `windres` (or a cross-prefixed variant) run as a child process
#[derive(Debug, Clone)]
pub struct Windres {
    program: String,
}

impl Default for Windres {
    fn default() -> Self {
        Self::new("windres")
    }
}

impl Windres {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Argument vector passed to the tool, in order
    pub fn args(request: &CompileRequest) -> Vec<String> {
        let mut args = vec![request.script.display().to_string()];
        for dir in &request.include_dirs {
            args.push("-I".to_string());
            args.push(dir.display().to_string());
        }
        args.push("-O".to_string());
        args.push(request.format.as_arg().to_string());
        args.push("-o".to_string());
        args.push(request.output.display().to_string());
        args
    }
}

impl ResourceCompiler for Windres {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, CompileError> {
        if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CompileError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let args = Self::args(request);
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CompileError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => CompileError::Spawn {
                    program: self.program.clone(),
                    source: e,
                },
            })?;

        if !output.status.success() {
            return Err(CompileError::ToolFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: output.stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stdout.trim().is_empty() {
            debug!("{} output:\n{}", self.program, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            warn!("{} reported:\n{}", self.program, stderr.trim_end());
        }
        info!(
            "Compiled {} -> {} ({})",
            request.script.display(),
            request.output.display(),
            request.format
        );

        Ok(CompileOutput { stdout, stderr })
    }
}
