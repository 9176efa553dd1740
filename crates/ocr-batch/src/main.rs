use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;

use ocr_batch::db::{artifact_repo, default_database_path, image_repo, project_repo, span_repo};
use ocr_batch::{
    load_config, logging, Config, ConfigError, Database, ImageOutcome, LogProgress,
    OcrBatchError, OutputMode, OverlayRenderer, OverlayStyle, Pipeline, PipelineConfig,
    TesseractEngine,
};

#[derive(Parser, Debug)]
#[command(name = "ocr-batch", version, about = "Batch OCR ingestion for image folders")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize, render and record every image of a project folder
    Run(RunArgs),
    /// List a project's image records
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Root folder holding one subfolder per project
    #[arg(short, long)]
    input: PathBuf,

    /// Root folder receiving one subfolder of artifacts per project
    #[arg(short, long)]
    output: PathBuf,

    /// Project name (subfolder of the input root)
    #[arg(short, long)]
    project: String,

    /// Which artifacts to write and record
    #[arg(long, value_enum, default_value_t = ModeArg::Full, conflicts_with = "pdf_only")]
    mode: ModeArg,

    /// Shorthand for `--mode minimal`
    #[arg(long)]
    pdf_only: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Project name
    #[arg(short, long)]
    project: String,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Minimal,
    Full,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Minimal => OutputMode::Minimal,
            ModeArg::Full => OutputMode::Full,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Status(args) => status(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_optional_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

/// CLI flag, then config file, then the per-user default.
fn resolve_database_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf, ConfigError> {
    flag.or_else(|| config.database_path.as_ref().map(PathBuf::from))
        .or_else(default_database_path)
        .ok_or_else(|| ConfigError::Validation {
            message: "Cannot determine home directory; pass --database".to_string(),
        })
}

fn run(args: RunArgs) -> Result<ExitCode, OcrBatchError> {
    let config = load_optional_config(args.config.as_deref())?;
    let db = Database::open(&resolve_database_path(args.database, &config)?)?;

    let mode = if args.pdf_only {
        OutputMode::Minimal
    } else {
        args.mode.into()
    };

    let engine = TesseractEngine::from_env(
        &config.ocr.languages,
        config.ocr.data_path.as_ref().map(PathBuf::from),
    );
    let renderer = OverlayRenderer::new(OverlayStyle::from_config(&config.render)?);
    let pipeline_config = PipelineConfig::new(args.input, args.output, args.project, mode);

    let pipeline = Pipeline::new(db, engine, renderer, pipeline_config);
    let report = pipeline.run(&LogProgress)?;

    for image in &report.images {
        match &image.outcome {
            ImageOutcome::Processed { .. } => println!("Done: {}", image.filename),
            ImageOutcome::Failed { reason } => {
                println!("Error processing {}: {}", image.filename, reason)
            }
        }
    }
    println!(
        "{} processed, {} failed",
        report.processed_count(),
        report.failed_count()
    );

    Ok(ExitCode::SUCCESS)
}

fn status(args: StatusArgs) -> Result<ExitCode, OcrBatchError> {
    let config = load_optional_config(args.config.as_deref())?;
    let db = Database::open(&resolve_database_path(args.database, &config)?)?;

    let Some(project) = project_repo::find_by_name(&db, &args.project)? else {
        eprintln!("No project named '{}'", args.project);
        return Ok(ExitCode::FAILURE);
    };

    println!(
        "Project '{}' (id {}, created {})",
        project.name, project.id, project.created_at
    );
    for image in image_repo::list_by_project(&db, project.id)? {
        let spans = span_repo::count_for_image(&db, image.id)?;
        let artifacts: Vec<String> = artifact_repo::list_for_image(&db, image.id)?
            .into_iter()
            .map(|a| a.kind.to_string())
            .collect();
        println!(
            "{:>6}  {:<10} {:<40} spans={:<5} artifacts=[{}]",
            image.id,
            image.status,
            image.filename,
            spans,
            artifacts.join(",")
        );
    }

    Ok(ExitCode::SUCCESS)
}
