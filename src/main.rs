//! icoforge - build-time icon and resource compiler helper
//!
//! Converts a PNG into a multi-size .ico, then runs windres on the
//! resource script that embeds it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use icoforge::config::Config;
use icoforge::ico::IconDir;
use icoforge::sizes::parse_sizes;
use icoforge::{
    CompileError, CompileRequest, IconJob, OutputFormat, Pipeline, PipelineError, ResampleFilter,
    ResourceCompiler, Windres,
};

#[derive(Parser, Debug)]
#[command(
    name = "icoforge",
    version,
    about = "PNG to multi-size ICO, then compile the resource script"
)]
struct Cli {
    /// Path to config file (default: ./icoforge.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log each frame and the compiler command line
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the icon, then compile the resource script
    Build {
        #[command(flatten)]
        icon: IconArgs,

        #[command(flatten)]
        compile: CompileArgs,

        /// Only build the icon
        #[arg(long)]
        skip_compile: bool,
    },

    /// Build the icon only
    Icon(IconArgs),

    /// Compile the resource script only
    Compile(CompileArgs),

    /// List the frames of an existing .ico file
    Inspect {
        /// ICO file to read
        path: PathBuf,
    },

    /// Write the effective configuration as JSON
    InitConfig {
        /// Destination (default: ./icoforge.json)
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct IconArgs {
    /// Source PNG
    #[arg(long)]
    source: Option<PathBuf>,

    /// Output .ico
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Comma-separated frame sizes, e.g. 16,32,256
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    sizes: Vec<i64>,

    /// Resampling filter
    #[arg(long, value_enum)]
    filter: Option<ResampleFilter>,
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// Resource script (.rc)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Compiled resource output
    #[arg(long)]
    object: Option<PathBuf>,

    /// Resource compiler executable
    #[arg(long)]
    windres: Option<String>,

    /// Output object format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Extra include directory for the resource compiler (repeatable)
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,
}

impl IconArgs {
    fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(icon) = self.icon {
            config.icon = icon;
        }
        if !self.sizes.is_empty() {
            config.sizes = self.sizes;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
    }
}

impl CompileArgs {
    fn apply(self, config: &mut Config) {
        if let Some(script) = self.script {
            config.resource_script = script;
        }
        if let Some(object) = self.object {
            config.resource_object = object;
        }
        if let Some(program) = self.windres {
            config.compiler.program = program;
        }
        if let Some(format) = self.format {
            config.compiler.format = format;
        }
        if !self.include_dirs.is_empty() {
            config.compiler.include_dirs = self.include_dirs;
        }
    }
}

fn icon_job(config: &Config) -> Result<IconJob> {
    Ok(IconJob {
        source: config.source.clone(),
        output: config.icon.clone(),
        sizes: parse_sizes(&config.sizes)?,
        filter: config.filter,
    })
}

fn compile_request(config: &Config) -> CompileRequest {
    CompileRequest {
        script: config.resource_script.clone(),
        output: config.resource_object.clone(),
        format: config.compiler.format,
        include_dirs: config.compiler.include_dirs.clone(),
    }
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let frames = IconDir::parse(&bytes)
        .with_context(|| format!("{} is not a valid icon", path.display()))?;

    println!("{}: {} frame(s)", path.display(), frames.len());
    for (index, frame) in frames.iter().enumerate() {
        println!(
            "  #{:<2} {:>4}x{:<4} {:>2} bpp  {}  {} bytes",
            index,
            frame.width,
            frame.height,
            frame.bit_count,
            if frame.is_png { "png" } else { "bmp" },
            frame.length
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            icon,
            compile,
            skip_compile,
        } => {
            icon.apply(&mut config);
            compile.apply(&mut config);

            let pipeline = Pipeline {
                icon: icon_job(&config)?,
                compile: (!skip_compile).then(|| compile_request(&config)),
            };
            let report = pipeline.run(&Windres::new(config.compiler.program.clone()))?;

            match report.compile {
                Some(_) => info!(
                    "Done: {} and {}",
                    report.icon.output.display(),
                    config.resource_object.display()
                ),
                None => info!("Done: {}", report.icon.output.display()),
            }
        }
        Commands::Icon(icon) => {
            icon.apply(&mut config);
            icon_job(&config)?.run()?;
        }
        Commands::Compile(compile) => {
            compile.apply(&mut config);
            Windres::new(config.compiler.program.clone()).compile(&compile_request(&config))?;
        }
        Commands::Inspect { path } => inspect(&path)?,
        Commands::InitConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(icoforge::config::LOCAL_CONFIG));
            config.save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn compile_error(err: &anyhow::Error) -> Option<&CompileError> {
    err.downcast_ref::<CompileError>()
        .or_else(|| match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Compile(e)) => Some(e),
            _ => None,
        })
}

/// Print the error; a failed tool's stderr is written byte for byte
fn report_error(err: &anyhow::Error) {
    match compile_error(err).and_then(|e| Some((e.headline(), e.stderr()?))) {
        Some((headline, bytes)) => {
            eprintln!("Error: {}:", headline);
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(bytes);
            let _ = stderr.flush();
        }
        None => eprintln!("Error: {:#}", err),
    }
}

/// Pass the resource compiler's own exit code through when there is one
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match compile_error(err).and_then(CompileError::exit_code) {
        Some(code) if (1..=255).contains(&code) => ExitCode::from(code as u8),
        _ => ExitCode::FAILURE,
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            exit_code(&err)
        }
    }
}
