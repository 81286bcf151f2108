//! Icon build followed by resource compilation
//!
//! The compile step only runs once the icon file has been written, since
//! the resource script refers to it by path.

use log::info;

use crate::compiler::{CompileOutput, CompileRequest, ResourceCompiler};
use crate::error::PipelineError;
use crate::icon::{IconJob, IconReport};

/// The two build steps
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub icon: IconJob,
    /// `None` builds the icon only
    pub compile: Option<CompileRequest>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub icon: IconReport,
    pub compile: Option<CompileOutput>,
}

impl Pipeline {
    pub fn run(&self, compiler: &dyn ResourceCompiler) -> Result<PipelineReport, PipelineError> {
        info!("Building icon {}", self.icon.output.display());
        let icon = self.icon.run()?;

        let compile = match &self.compile {
            Some(request) => {
                info!("Compiling resource script {}", request.script.display());
                Some(compiler.compile(request)?)
            }
            None => None,
        };

        Ok(PipelineReport { icon, compile })
    }
}
