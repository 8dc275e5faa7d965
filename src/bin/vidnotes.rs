use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::{Env, Target, WriteStyle};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use vidnotes::{
    FfmpegSampler, HardwareAccelerationMode, MergeOutcome, OperationType, Pipeline,
    PipelineOptions, ProgressCallback, ProgressInfo, RunReport, VidnotesError,
    configuration::{DEFAULT_INPUT_DIRECTORY, DEFAULT_MERGED_NAME, DEFAULT_OUTPUT_DIRECTORY},
    ffmpeg::{FFMPEG, check_tool},
    utilities::to_ascii_lossy,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidnotes run\n  vidnotes --input lectures --output notes run --workers 8 --interval 30\n  vidnotes run --hardware cuda --json\n  vidnotes list\n  vidnotes merge\n  vidnotes completions zsh > _vidnotes";

#[derive(Debug, Parser)]
#[command(
    name = "vidnotes",
    version,
    about = "Turn a folder of lecture videos into one PDF of sampled frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone)]
struct GlobalOptions {
    /// Folder containing the lecture videos (mp4, webm, mkv).
    #[arg(long, global = true, default_value = DEFAULT_INPUT_DIRECTORY)]
    input: PathBuf,

    /// Folder receiving frames, per-video PDFs and the merged PDF.
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIRECTORY)]
    output: PathBuf,

    /// Append-only log file.
    #[arg(long, global = true, default_value = "run.log")]
    log_file: PathBuf,

    /// Log debug detail and print every finished video.
    #[arg(long, global = true)]
    verbose: bool,

    /// Print ASCII only, replacing other characters with '?'.
    #[arg(long, global = true)]
    ascii: bool,

    /// Do not draw a progress bar.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract, assemble and merge every video.
    #[command(
        about = "Process all videos and merge the result",
        after_help = "Examples:\n  vidnotes run\n  vidnotes run --workers 2 --interval 20 --hardware vaapi"
    )]
    Run {
        /// Videos processed at the same time.
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Seconds between two sampled frames.
        #[arg(long, default_value_t = 50.0)]
        interval: f64,
        /// Hardware decoding (software, auto, cuda, vaapi, qsv, videotoolbox, dxva2, d3d11va).
        #[arg(long, default_value = "software")]
        hardware: HardwareAccelerationMode,
        /// Path to the ffmpeg executable.
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
        /// File name of the merged PDF inside the output folder.
        #[arg(long, default_value = DEFAULT_MERGED_NAME)]
        merged_name: String,
        /// Print a machine-readable summary.
        #[arg(long)]
        json: bool,
    },

    /// Merge the per-video PDFs that already exist.
    #[command(about = "Merge existing per-video PDFs")]
    Merge {
        /// File name of the merged PDF inside the output folder.
        #[arg(long, default_value = DEFAULT_MERGED_NAME)]
        merged_name: String,
    },

    /// Show the videos that would be processed, in order.
    #[command(about = "List input videos in processing order")]
    List,

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Console output that survives terminals without UTF-8 support.
#[derive(Clone)]
struct Console {
    ascii: bool,
    bar: Option<ProgressBar>,
}

impl Console {
    fn line(&self, text: &str) {
        let write = || {
            let mut stdout = io::stdout().lock();
            if self.ascii || writeln!(stdout, "{text}").is_err() {
                let _ = writeln!(stdout, "{}", to_ascii_lossy(text));
            }
        };

        match &self.bar {
            Some(bar) => bar.suspend(write),
            None => write(),
        }
    }
}

struct TerminalProgress {
    console: Console,
    verbose: bool,
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.operation {
            OperationType::VideoProcessing => {
                if let Some(bar) = &self.console.bar {
                    if let Some(total) = info.total {
                        bar.set_length(total);
                    }
                    bar.set_position(info.current);
                }

                match (&info.item, &info.failure) {
                    (Some(item), Some(reason)) => self.console.line(&format!(
                        "{} {} → {}",
                        "ERROR processing".red().bold(),
                        item,
                        reason
                    )),
                    (Some(item), None) if self.verbose || self.console.bar.is_none() => {
                        self.console.line(&format!("{} {}", "done".green(), item));
                    }
                    (None, _) => {
                        if let Some(bar) = &self.console.bar {
                            bar.finish_and_clear();
                        }
                    }
                    _ => {}
                }
            }
            OperationType::Merging => {
                if let Some(item) = &info.item {
                    self.console.line(&format!("Adding: {item}"));
                }
            }
            _ => {}
        }
    }
}

fn init_logging(path: &Path, verbose: bool) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let default_filter = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format_timestamp_secs()
        .try_init()?;
    Ok(())
}

/// Log the version line of the sampling tool, returning it if the tool
/// answered.
fn log_tool_version(program: &Path) -> Option<String> {
    let info = check_tool(&program.to_string_lossy());
    match &info.version {
        Some(version) => log::info!("Using {} ({version})", program.display()),
        None => log::warn!("{} did not report a version", program.display()),
    }
    info.version
}

fn progress_bar() -> Result<ProgressBar, Box<dyn Error>> {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

/// Print an informational startup condition and swallow it; pass anything
/// else on.
fn end_early(console: &Console, error: VidnotesError) -> Result<(), Box<dyn Error>> {
    if !error.is_informational() {
        return Err(error.into());
    }

    log::error!("{error}");
    let message = match &error {
        VidnotesError::NoVideosFound(_) => format!("{error}").yellow(),
        _ => format!("ERROR: {error}").red().bold(),
    };
    console.line(&message.to_string());
    Ok(())
}

fn base_options(global: &GlobalOptions) -> PipelineOptions {
    PipelineOptions::new()
        .with_input_directory(global.input.clone())
        .with_output_directory(global.output.clone())
}

fn merge_json(outcome: &MergeOutcome) -> Value {
    match outcome {
        MergeOutcome::AlreadyPresent { path } => json!({
            "status": "already_present",
            "path": path.display().to_string(),
        }),
        MergeOutcome::NothingToMerge => json!({ "status": "nothing_to_merge" }),
        MergeOutcome::Written {
            path,
            inputs,
            pages,
        } => json!({
            "status": "written",
            "path": path.display().to_string(),
            "inputs": inputs.iter().map(|input| input.display().to_string()).collect::<Vec<_>>(),
            "pages": pages,
        }),
    }
}

fn report_json(report: &RunReport) -> Value {
    json!({
        "videos": report.videos.iter().map(|video| json!({
            "file": video.source.display_name(),
            "identifier": video.source.identifier(),
            "succeeded": video.succeeded(),
            "pdf": video.outcome.as_ref().ok().map(|processed| processed.pdf.display().to_string()),
            "error": video.outcome.as_ref().err().map(ToString::to_string),
        })).collect::<Vec<_>>(),
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "missing": report.missing,
        "merge": merge_json(&report.merge),
    })
}

fn print_merge(console: &Console, outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::AlreadyPresent { path } => console.line(&format!(
            "{} {}",
            "Merged PDF already exists, skipping merge:".yellow(),
            path.display()
        )),
        MergeOutcome::NothingToMerge => console.line(&"No PDFs to merge.".yellow().to_string()),
        MergeOutcome::Written { path, pages, .. } => console.line(&format!(
            "{} {} ({} pages)",
            "Final merged PDF created:".green().bold(),
            path.display(),
            pages
        )),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let global = cli.global;

    if !matches!(cli.command, Commands::Completions { .. }) {
        init_logging(&global.log_file, global.verbose)?;
    }

    match cli.command {
        Commands::Run {
            workers,
            interval,
            hardware,
            ffmpeg,
            merged_name,
            json,
        } => {
            let interval = Duration::try_from_secs_f64(interval)
                .map_err(|_| format!("invalid --interval: {interval}"))?;
            let console = Console {
                ascii: global.ascii,
                bar: (!global.no_progress && !json).then(progress_bar).transpose()?,
            };

            let sampler = match FfmpegSampler::locate(ffmpeg.as_deref()) {
                Ok(sampler) => sampler,
                Err(error) => return end_early(&console, error),
            };
            log_tool_version(sampler.program());

            let mut options = base_options(&global)
                .with_merged_name(merged_name)
                .with_workers(workers)
                .with_frame_interval(interval)
                .with_hardware_acceleration(hardware);
            if !json {
                options = options.with_progress(Arc::new(TerminalProgress {
                    console: console.clone(),
                    verbose: global.verbose,
                }));
            }
            log::info!("Starting run with {options:?}");

            if !json {
                console.line(&"Starting multi-threaded processing...".bold().to_string());
            }

            let report = match Pipeline::with_sampler(options, sampler).run() {
                Ok(report) => report,
                Err(error) => return end_early(&console, error),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
                return Ok(());
            }

            print_merge(&console, &report.merge);
            console.line(&format!(
                "{} of {} videos processed",
                report.succeeded(),
                report.videos.len()
            ));
            if !report.is_complete() {
                console.line(&format!(
                    "{} {}",
                    "warning: missing from merge:".yellow().bold(),
                    report.missing.join(", ")
                ));
            }
            console.line(&"ALL DONE.".green().bold().to_string());
        }
        Commands::Merge { merged_name } => {
            let console = Console {
                ascii: global.ascii,
                bar: None,
            };
            let options = base_options(&global)
                .with_merged_name(merged_name)
                .with_progress(Arc::new(TerminalProgress {
                    console: console.clone(),
                    verbose: global.verbose,
                }));

            console.line("Merging PDFs...");
            let outcome = Pipeline::with_sampler(options, FfmpegSampler::new(FFMPEG)).merge()?;
            print_merge(&console, &outcome);
        }
        Commands::List => {
            let console = Console {
                ascii: global.ascii,
                bar: None,
            };
            let pipeline = Pipeline::with_sampler(base_options(&global), FfmpegSampler::new(FFMPEG));

            let sources = match pipeline.discover() {
                Ok(sources) => sources,
                Err(error) => return end_early(&console, error),
            };
            if sources.is_empty() {
                return end_early(&console, VidnotesError::NoVideosFound(global.input));
            }

            for source in sources {
                let pdf = source.pdf_path(&global.output);
                let status = if pdf.exists() {
                    "done".green()
                } else {
                    "pending".yellow()
                };
                console.line(&format!(
                    "{:>9}  {}  {}",
                    source.identifier(),
                    status,
                    source.display_name()
                ));
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidnotes", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unknown_tool_has_no_version() {
        let missing = std::path::Path::new("vidnotes-no-such-ffmpeg");
        assert_eq!(super::log_tool_version(missing), None);
    }

    #[test]
    fn run_defaults() {
        use clap::Parser;

        let cli = Cli::parse_from(["vidnotes", "run"]);
        match cli.command {
            super::Commands::Run {
                workers,
                interval,
                hardware,
                ..
            } => {
                assert_eq!(workers, 4);
                assert_eq!(interval, 50.0);
                assert_eq!(hardware, vidnotes::HardwareAccelerationMode::Software);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.global.input, std::path::PathBuf::from("video"));
        assert_eq!(cli.global.output, std::path::PathBuf::from("pdf"));
    }
}
