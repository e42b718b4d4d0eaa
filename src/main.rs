//! CLI entry point for the sound level meter dump converter.
//!
//! Reads every dump in `<input-dir>/<project>` and writes `third_octave.csv`
//! and `octave.csv` to `<output-dir>/<project>`.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use slm_octave::output::{print_json, table_paths};
use slm_octave::{ConvertOptions, MissingRecordPolicy, convert_directory};
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const INPUT_FOLDER: &str = "soundlevelmeterdump";
const OUTPUT_FOLDER: &str = "soundleveldata";

#[derive(Parser)]
#[command(name = "slm_octave")]
#[command(
    about = "Convert sound level meter dumps into third octave and octave band CSV tables",
    long_about = None
)]
struct Cli {
    /// Where data comes from [default: ~/Documents/soundlevelmeterdump]
    #[arg(long, env = "SLM_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Where new files go [default: ~/Documents/soundleveldata]
    #[arg(long, env = "SLM_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Name of project. Input is read from input_dir/project and output written to output_dir/project
    #[arg(long, env = "SLM_PROJECT")]
    project: Option<String>,

    /// Do not wait for the measurements to be placed in the input directory
    #[arg(long = "no-wait", action = ArgAction::SetFalse)]
    wait: bool,

    /// What to do with a dump that lacks a record for some category
    #[arg(long, value_enum, default_value_t = MissingRecordPolicy::Abort)]
    missing_records: MissingRecordPolicy,

    /// Process dumps in directory order instead of sorting them by name
    #[arg(long, default_value_t = false)]
    unsorted: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/slm_octave.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("slm_octave.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let project = match cli.project {
        Some(project) => project,
        None => prompt("Enter project name: ")?,
    };
    if project.is_empty() {
        bail!("project name must not be empty");
    }

    let input_root = resolve_root(cli.input_dir, INPUT_FOLDER)?;
    let output_root = resolve_root(cli.output_dir, OUTPUT_FOLDER)?;

    let input_dir = input_root.join(&project);
    let output_dir = output_root.join(&project);

    for dir in [&input_dir, &output_dir] {
        ensure_dir(dir)?;
    }

    if cli.wait {
        prompt(&format!(
            "Press enter when sound level measurements have been placed in {}",
            absolute(&input_dir).display()
        ))?;
    }

    let options = ConvertOptions {
        sorted: !cli.unsorted,
        missing_records: cli.missing_records,
    };

    let summary = convert_directory(&input_dir, &output_dir, &options)
        .with_context(|| format!("converting dumps in {}", input_dir.display()))?
        .with_project(&project);

    print_json(&summary)?;

    let (third, octave) = table_paths(&output_dir);
    info!(
        third_octave = %absolute(&third).display(),
        octave = %absolute(&octave).display(),
        "Files written to {}",
        absolute(&output_dir).display()
    );

    Ok(())
}

/// Creates `dir` if it is missing, logging the creation.
fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        info!(dir = %absolute(dir).display(), "Created directory");
    }
    Ok(())
}

/// Prints `message` and reads one line from stdin, without its terminator.
fn prompt(message: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{message}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// The directory given on the command line, or `~/Documents/<folder>`.
fn resolve_root(arg: Option<PathBuf>, folder: &str) -> Result<PathBuf> {
    match arg {
        Some(dir) => Ok(dir),
        None => {
            let home = dirs::home_dir()
                .context("cannot locate the home directory; pass --input-dir and --output-dir")?;
            Ok(home.join("Documents").join(folder))
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
