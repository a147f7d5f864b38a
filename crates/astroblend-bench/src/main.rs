//! astroblend-bench: CLI tool for stretch/blend parameter experimentation.
//!
//! Plans a pipeline from the given workflow and parameters, then either
//! prints it or drives a live engine process with it. Useful for:
//!
//! - Inspecting the exact command sequence a parameter set produces
//! - Comparing slider mappings without opening the interactive UI
//! - Exercising an engine installation end to end from a script
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin astroblend-bench -- core-blend stack.fits --core-stretch 120
//! cargo run --release --bin astroblend-bench -- recombine starless.fits stars.fits \
//!     --engine siril-cli --engine-arg -s --mode save-native
//! ```
//!
//! Without `--engine` the commands are printed to stdout and nothing
//! runs, so no source files are touched.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use astroblend_control::workdir_in_temp;
use astroblend_engine::{run_pipeline, ProcessEngine, RunStatus};
use astroblend_pipeline::{
    CoreBlendParams, Pipeline, RenderMode, SessionState, SourceSlot, StarRecombineParams, Workflow,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stretch/blend pipeline experimentation for astroblend.
///
/// Plans the selected workflow's pipeline from CLI parameters and
/// prints the engine commands, or runs them against a live engine.
#[derive(Parser)]
#[command(name = "astroblend-bench", version)]
struct Cli {
    #[command(subcommand)]
    workflow: WorkflowCommand,

    /// Engine program to drive. When omitted, the planned commands are
    /// printed and nothing is executed.
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Extra argument passed to the engine program (repeatable).
    #[arg(long = "engine-arg", global = true)]
    engine_args: Vec<String>,

    /// Working directory for intermediate artifacts.
    ///
    /// Defaults to `astroblend` under the system temp directory.
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// What the run is for.
    #[arg(long, value_enum, default_value_t = Mode::Preview, global = true)]
    mode: Mode,

    /// Print the pipeline as JSON instead of engine command lines.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum WorkflowCommand {
    /// Stretch one linear source two ways and feather-blend the core.
    CoreBlend(CoreBlendArgs),
    /// Screen a processed starmask back over a starless base.
    Recombine(RecombineArgs),
}

#[derive(Args)]
struct CoreBlendArgs {
    /// Linear source image.
    source: PathBuf,

    /// Asinh stretch strength for the core layer.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_CORE_STRETCH)]
    core_stretch: f64,

    /// Black point for the core stretch.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_CORE_BLACK_POINT)]
    core_black_point: f64,

    /// Saturation for the core layer.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_CORE_SATURATION)]
    core_saturation: f64,

    /// Nebula stretch intensity, raw 0-100 slider position.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_NEBULA_STRETCH_RAW)]
    nebula_stretch: f64,

    /// Nebula black point, raw 0-100 slider position.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_NEBULA_BLACK_POINT_RAW)]
    nebula_black_point: f64,

    /// Blend mask feather radius in pixels.
    #[arg(long, default_value_t = CoreBlendParams::DEFAULT_FEATHER_RADIUS)]
    feather_radius: f64,

    /// Full parameter set as a JSON string.
    ///
    /// When provided, all individual parameter flags are ignored. The
    /// JSON must be a valid `CoreBlendParams` serialization;
    /// out-of-range values are clamped on load.
    #[arg(long)]
    params_json: Option<String>,
}

#[derive(Args)]
struct RecombineArgs {
    /// Starless nebula base image.
    starless: PathBuf,

    /// Linear starmask image.
    starmask: PathBuf,

    /// Asinh stretch strength for the starmask.
    #[arg(long, default_value_t = StarRecombineParams::DEFAULT_ASINH_STRETCH)]
    asinh_stretch: f64,

    /// Black point for the starmask stretch.
    #[arg(long, default_value_t = StarRecombineParams::DEFAULT_BLACK_POINT)]
    black_point: f64,

    /// Midtone balance for the starmask.
    #[arg(long, default_value_t = StarRecombineParams::DEFAULT_MIDTONES)]
    midtones: f64,

    /// Saturation for the starmask.
    #[arg(long, default_value_t = StarRecombineParams::DEFAULT_SATURATION)]
    saturation: f64,

    /// Star softening blur radius in pixels.
    #[arg(long, default_value_t = StarRecombineParams::DEFAULT_BLUR_RADIUS)]
    blur_radius: f64,

    /// Full parameter set as a JSON string.
    ///
    /// When provided, all individual parameter flags are ignored. The
    /// JSON must be a valid `StarRecombineParams` serialization;
    /// out-of-range values are clamped on load.
    #[arg(long)]
    params_json: Option<String>,
}

/// Run purpose selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Diagnostic JPEG exports into the working directory.
    Preview,
    /// Lossless export next to the original source.
    SaveNative,
    /// JPEG export next to the original source.
    SaveWeb,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Preview => Self::Preview,
            Mode::SaveNative => Self::SaveNative,
            Mode::SaveWeb => Self::SaveWeb,
        }
    }
}

/// Build `CoreBlendParams` from CLI arguments.
///
/// If `--params-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn core_blend_params(args: &CoreBlendArgs) -> Result<CoreBlendParams, String> {
    if let Some(ref json) = args.params_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --params-json: {e}"));
    }
    Ok(CoreBlendParams::from_values(
        args.core_stretch,
        args.core_black_point,
        args.core_saturation,
        args.nebula_stretch,
        args.nebula_black_point,
        args.feather_radius,
    ))
}

/// Build `StarRecombineParams` from CLI arguments.
fn recombine_params(args: &RecombineArgs) -> Result<StarRecombineParams, String> {
    if let Some(ref json) = args.params_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --params-json: {e}"));
    }
    Ok(StarRecombineParams::from_values(
        args.asinh_stretch,
        args.black_point,
        args.midtones,
        args.saturation,
        args.blur_radius,
    ))
}

/// Source images of the selected workflow, in slot order.
fn sources(command: &WorkflowCommand) -> Vec<(SourceSlot, &Path)> {
    match command {
        WorkflowCommand::CoreBlend(args) => vec![(SourceSlot::Base, args.source.as_path())],
        WorkflowCommand::Recombine(args) => vec![
            (SourceSlot::Starless, args.starless.as_path()),
            (SourceSlot::Starmask, args.starmask.as_path()),
        ],
    }
}

/// Copy each source into the working directory under its canonical
/// name, the way the interactive import does.
fn import_sources(session: &SessionState) -> Result<(), String> {
    fs::create_dir_all(session.work_dir())
        .map_err(|e| format!("Error creating {}: {e}", session.work_dir().display()))?;
    for slot in [SourceSlot::Base, SourceSlot::Starless, SourceSlot::Starmask] {
        if let Some(original) = session.source(slot) {
            let destination = session.artifact_path(slot.canonical_name());
            fs::copy(original, &destination)
                .map_err(|e| format!("Error copying {}: {e}", original.display()))?;
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), String> {
    let work_dir = match cli.work_dir {
        Some(ref dir) => dir.clone(),
        None => workdir_in_temp("astroblend")
            .map_err(|e| format!("Error creating working directory: {e}"))?,
    };

    let mut session = SessionState::new(work_dir);
    for (slot, path) in sources(&cli.workflow) {
        session.register_source(slot, path.to_path_buf());
    }

    let mode = RenderMode::from(cli.mode);
    let pipeline: Pipeline = match &cli.workflow {
        WorkflowCommand::CoreBlend(args) => core_blend_params(args)?
            .plan(&session, mode)
            .map_err(|e| e.to_string())?,
        WorkflowCommand::Recombine(args) => recombine_params(args)?
            .plan(&session, mode)
            .map_err(|e| e.to_string())?,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&pipeline)
            .map_err(|e| format!("Error serializing pipeline: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let Some(ref program) = cli.engine else {
        for command in pipeline.commands() {
            println!("{command}");
        }
        return Ok(());
    };

    import_sources(&session)?;

    let mut engine = ProcessEngine::spawn(program, &cli.engine_args)
        .map_err(|e| format!("Error starting engine {program}: {e}"))?;
    let report = run_pipeline(&mut engine, &pipeline);
    let shutdown = engine.shutdown();

    eprintln!("{}/{} operations completed", report.executed, report.total);
    if let RunStatus::Failed { index, ref error } = report.status {
        let command = pipeline
            .commands()
            .get(index)
            .cloned()
            .unwrap_or_default();
        return Err(format!("Engine rejected `{command}`: {error}"));
    }
    shutdown.map_err(|e| format!("Error shutting down engine: {e}"))?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
