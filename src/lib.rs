//! icoforge - turn a PNG into a multi-size Windows icon and compile the
//! resource script that embeds it.
//!
//! The work happens in two steps, run in order by [`pipeline::Pipeline`]:
//! the icon builder ([`icon`]) and the resource compiler ([`compiler`]).

pub mod compiler;
pub mod config;
pub mod error;
pub mod ico;
pub mod icon;
pub mod pipeline;
pub mod sizes;

pub use compiler::{CompileRequest, OutputFormat, ResourceCompiler, Windres};
pub use config::Config;
pub use error::{CompileError, ConfigError, IcoFormatError, IconError, PipelineError};
pub use icon::{build_icon, IconJob, IconReport, ResampleFilter};
pub use pipeline::{Pipeline, PipelineReport};
