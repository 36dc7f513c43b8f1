// quicksum: summarize pasted text or documents (.txt, .pdf, .docx) with a
// selectable summarization model. Long inputs are summarized in word-bounded
// chunks and repeated sentences are dropped from the result.
mod backend;
mod config;
mod error;
mod extract;
mod models;
mod pipeline;
mod text;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::{InferenceSettings, LengthParams, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use crate::error::SummaryError;
use crate::extract::collect_inputs;
use crate::models::{default_model, resolve_model, ModelCache, ModelPreset, MODEL_PRESETS};
use crate::pipeline::{summarize_files, summarize_text, FileOutcome, FileReport};

#[derive(Parser)]
#[command(name = "quicksum", version, about = "Summarize text and documents with pre-trained models")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available summarization models
    Models,
    /// Summarize text given as an argument, or read from stdin
    Text {
        /// Text to summarize; stdin is read when omitted
        text: Option<String>,
        #[command(flatten)]
        opts: SummaryArgs,
        /// Also save the summary to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Summarize files one after another; directories are searched for documents
    Files {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        opts: SummaryArgs,
        /// Save each summary as <file name>_summary.txt in this directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Model display name (e.g. "T5 Small") or model id
    #[arg(short, long)]
    model: Option<String>,
    /// Maximum summary length
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH as u16, value_parser = clap::value_parser!(u16).range(50..=300))]
    max_length: u16,
    /// Minimum summary length
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH as u16, value_parser = clap::value_parser!(u16).range(10..=150))]
    min_length: u16,
}

impl SummaryArgs {
    fn preset(&self) -> Result<&'static ModelPreset> {
        match &self.model {
            Some(selection) => resolve_model(selection),
            None => Ok(default_model()),
        }
    }

    fn params(&self) -> Result<LengthParams> {
        LengthParams::new(self.max_length as usize, self.min_length as usize)
    }
}

fn print_status(color: Color, msg: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(stderr, "{}", msg);
    let _ = stderr.reset();
}

fn models_table() -> String {
    let width = MODEL_PRESETS.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for preset in MODEL_PRESETS {
        let marker = if preset == default_model() { " (default)" } else { "" };
        out.push_str(&format!("{:<width$}  {}{}\n", preset.name, preset.id, marker, width = width));
    }
    out
}

/// Load the selected model up front so a broken model is reported once.
///
/// A failure is only a warning: every request will then report the
/// summarizer as not initialized.
fn preload_model(cache: &ModelCache, preset: &ModelPreset) {
    if cache.is_loaded(preset.id) {
        return;
    }
    print_status(Color::Cyan, &format!("Loading {} model...", preset.id));
    match cache.get(preset.id) {
        Ok(_) => print_status(Color::Green, &format!("{} model loaded!", preset.id)),
        Err(SummaryError::NotInitialized { model }) => print_status(
            Color::Yellow,
            &format!("Error initializing summarizer model '{}' (run with -v for details)", model),
        ),
        Err(e) => print_status(Color::Red, &e.to_string()),
    }
}

fn summary_file_name(name: &str) -> String {
    format!("{}_summary.txt", name)
}

fn write_summary(path: &Path, summary: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut f = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    f.write_all(summary.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn read_input_text(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .context("Failed to read text from stdin")?;
            Ok(s)
        }
    }
}

fn run_text(cache: &ModelCache, text: Option<String>, opts: &SummaryArgs, out: Option<&Path>) -> Result<bool> {
    let preset = opts.preset()?;
    let params = opts.params()?;

    let raw = read_input_text(text)?;
    if raw.is_empty() {
        print_status(Color::Red, "Please enter some text to summarize.");
        return Ok(false);
    }

    preload_model(cache, preset);
    match summarize_text(cache, preset.id, &raw, &params) {
        Ok(summary) => {
            println!("{}", summary);
            if let Some(path) = out {
                write_summary(path, &summary)?;
                print_status(Color::Green, &format!("Summary saved to {}", path.display()));
            }
            Ok(true)
        }
        Err(e) => {
            print_status(Color::Red, &e.to_string());
            Ok(false)
        }
    }
}

fn report_file(report: &FileReport, out_dir: Option<&Path>) {
    let name = report.display_name();
    match &report.outcome {
        FileOutcome::Summarized(summary) => {
            println!("Summary for {}", name);
            println!("{}\n", summary);
            if let Some(dir) = out_dir {
                let path = dir.join(summary_file_name(&name));
                match write_summary(&path, summary) {
                    Ok(()) => print_status(Color::Green, &format!("Saved {}", path.display())),
                    Err(e) => print_status(Color::Red, &format!("Error for {}: {:#}", name, e)),
                }
            }
        }
        FileOutcome::Failed(e) => print_status(Color::Red, &format!("Error for {}: {}", name, e)),
        FileOutcome::NoSummary => print_status(
            Color::Yellow,
            &format!("No summary generated for {}. It might be empty or unreadable.", name),
        ),
    }
}

fn run_files(cache: &ModelCache, paths: &[PathBuf], opts: &SummaryArgs, out_dir: Option<&Path>) -> Result<()> {
    let preset = opts.preset()?;
    let params = opts.params()?;

    let files = collect_inputs(paths);
    if files.is_empty() {
        bail!("no documents found in the given paths");
    }

    preload_model(cache, preset);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Processing files and generating summaries...");
    pb.enable_steady_tick(Duration::from_millis(120));

    let reports = summarize_files(cache, preset.id, &files, &params, |report| {
        pb.suspend(|| report_file(report, out_dir));
    });
    pb.finish_and_clear();

    let done = reports
        .iter()
        .filter(|r| matches!(r.outcome, FileOutcome::Summarized(_)))
        .count();
    log::info!("summarized {} of {} files", done, reports.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let cache = ModelCache::new(InferenceSettings::from_env());
    match cli.command {
        Commands::Models => print!("{}", models_table()),
        Commands::Text { text, opts, out } => {
            if !run_text(&cache, text, &opts, out.as_deref())? {
                std::process::exit(1);
            }
        }
        Commands::Files { paths, opts, out_dir } => run_files(&cache, &paths, &opts, out_dir.as_deref())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_text_defaults() {
        let cli = Cli::try_parse_from(["quicksum", "text", "hello world"]).unwrap();
        match cli.command {
            Commands::Text { text, opts, out } => {
                assert_eq!(text.as_deref(), Some("hello world"));
                assert_eq!(opts.max_length, 200);
                assert_eq!(opts.min_length, 100);
                assert!(opts.model.is_none());
                assert!(out.is_none());
                assert_eq!(opts.preset().unwrap().id, "facebook/bart-large-cnn");
            }
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_cli_files_options() {
        let cli = Cli::try_parse_from([
            "quicksum", "files", "a.pdf", "b.docx", "--model", "T5 Small", "--max-length", "120",
            "--min-length", "30", "--out-dir", "summaries", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Files { paths, opts, out_dir } => {
                assert_eq!(paths, vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")]);
                assert_eq!(opts.preset().unwrap().id, "t5-small");
                assert_eq!(opts.params().unwrap(), LengthParams { max_length: 120, min_length: 30 });
                assert_eq!(out_dir, Some(PathBuf::from("summaries")));
            }
            _ => panic!("expected files command"),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_lengths() {
        assert!(Cli::try_parse_from(["quicksum", "text", "x", "--max-length", "400"]).is_err());
        assert!(Cli::try_parse_from(["quicksum", "text", "x", "--max-length", "49"]).is_err());
        assert!(Cli::try_parse_from(["quicksum", "text", "x", "--min-length", "5"]).is_err());
        assert!(Cli::try_parse_from(["quicksum", "text", "x", "--min-length", "151"]).is_err());
    }

    #[test]
    fn test_cli_files_requires_paths() {
        assert!(Cli::try_parse_from(["quicksum", "files"]).is_err());
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let cli = Cli::try_parse_from(["quicksum", "text", "x", "-m", "Pegasus"]).unwrap();
        match cli.command {
            Commands::Text { opts, .. } => assert!(opts.preset().is_err()),
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_models_table_lists_every_preset() {
        let table = models_table();
        for preset in MODEL_PRESETS {
            assert!(table.contains(preset.name));
            assert!(table.contains(preset.id));
        }
        assert_eq!(table.matches("(default)").count(), 1);
        assert!(table.lines().next().unwrap().contains("(default)"));
    }

    #[test]
    fn test_summary_file_name_keeps_extension() {
        assert_eq!(summary_file_name("notes.pdf"), "notes.pdf_summary.txt");
    }

    #[test]
    fn test_write_summary_creates_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out/nested/summary.txt");
        write_summary(&path, "Short summary.")?;
        assert_eq!(std::fs::read_to_string(&path)?, "Short summary.");
        Ok(())
    }

    #[test]
    fn test_read_input_text_prefers_argument() -> Result<()> {
        assert_eq!(read_input_text(Some("given".to_string()))?, "given");
        Ok(())
    }

    #[test]
    fn test_run_text_with_local_model() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("summary.txt");
        let cache = ModelCache::new(InferenceSettings::default());
        let cli = Cli::try_parse_from(["quicksum", "text", "x", "-m", "local/extractive"]).unwrap();
        let opts = match cli.command {
            Commands::Text { opts, .. } => opts,
            _ => panic!("expected text command"),
        };

        let ok = run_text(&cache, Some("A tiny   note.\nNothing more.".to_string()), &opts, Some(&out))?;
        assert!(ok);
        assert_eq!(std::fs::read_to_string(&out)?, "A tiny note. Nothing more.");
        Ok(())
    }

    #[test]
    fn test_run_text_empty_input_fails_without_writing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("summary.txt");
        let cache = ModelCache::new(InferenceSettings::default());
        let cli = Cli::try_parse_from(["quicksum", "text", "x", "-m", "local/extractive"]).unwrap();
        let opts = match cli.command {
            Commands::Text { opts, .. } => opts,
            _ => panic!("expected text command"),
        };

        assert!(!run_text(&cache, Some(String::new()), &opts, Some(&out))?);
        assert!(!run_text(&cache, Some("   \n".to_string()), &opts, Some(&out))?);
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_run_files_writes_summaries() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let docs = temp_dir.path().join("docs");
        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&docs)?;
        std::fs::write(docs.join("a.txt"), "First file. It is short.")?;
        std::fs::write(docs.join("b.txt"), "")?;

        let cache = ModelCache::new(InferenceSettings::default());
        let cli = Cli::try_parse_from(["quicksum", "files", "x", "-m", "Extractive (local)"]).unwrap();
        let opts = match cli.command {
            Commands::Files { opts, .. } => opts,
            _ => panic!("expected files command"),
        };

        run_files(&cache, &[docs], &opts, Some(&out_dir))?;
        assert_eq!(
            std::fs::read_to_string(out_dir.join("a.txt_summary.txt"))?,
            "First file. It is short."
        );
        assert!(!out_dir.join("b.txt_summary.txt").exists());
        Ok(())
    }

    #[test]
    fn test_run_files_empty_directory_is_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let cache = ModelCache::new(InferenceSettings::default());
        let cli = Cli::try_parse_from(["quicksum", "files", "x"]).unwrap();
        let opts = match cli.command {
            Commands::Files { opts, .. } => opts,
            _ => panic!("expected files command"),
        };
        assert!(run_files(&cache, &[temp_dir.path().to_path_buf()], &opts, None).is_err());
        Ok(())
    }
}
