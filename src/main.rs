use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use highlight_curator::document::docx::write_docx;
use highlight_curator::parser::EmptyReason;
use highlight_curator::{
    chapters_from_text, decode_lossy, entries_from_json, entries_to_json, parse_with,
    safe_file_name, Assembler, ChapterMark, Entry, FontChoice, ParseReport, Settings, Strategy,
};

#[derive(Parser)]
#[command(name = "highlight_curator", about = "Curate e-reader highlight exports into .docx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw export and write entries as JSON for review
    Parse {
        input: PathBuf,
        /// Output JSON path (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,
    },
    /// Build a .docx from reviewed entries JSON
    Render {
        entries: PathBuf,
        #[command(flatten)]
        doc: DocArgs,
    },
    /// Parse + render in one step
    Run {
        input: PathBuf,
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,
        #[command(flatten)]
        doc: DocArgs,
    },
    /// Convert many exports in parallel, one .docx per input
    Batch {
        inputs: Vec<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,
        #[arg(short, long, value_enum)]
        font: Option<FontChoice>,
        /// Chapter rows file applied to every input
        #[arg(long)]
        chapters: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DocArgs {
    /// Output .docx path (default: derived from the title)
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[arg(short, long)]
    title: Option<String>,
    /// Reading note shown under the title
    #[arg(short, long)]
    note: Option<String>,
    #[arg(short, long, value_enum)]
    font: Option<FontChoice>,
    /// Chapter row "Kind,value,Title" (repeatable)
    #[arg(short, long = "chapter")]
    chapter: Vec<String>,
    /// File of chapter rows, one per line
    #[arg(long)]
    chapters: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().unwrap_or_else(|e| {
        warn!("ignoring unreadable settings: {}", e);
        Settings::default()
    });

    let result = match cli.command {
        Commands::Parse { input, out, strategy } => {
            let report = parse_file(&input, strategy.unwrap_or(settings.strategy))?;
            // stdout may be the JSON itself.
            eprintln!("{}", report_summary(&input, &report));
            write_entries(&report.entries, out.as_deref(), &mut std::io::stdout().lock())
        }
        Commands::Render { entries, doc } => {
            let raw = fs::read_to_string(&entries)
                .with_context(|| format!("Failed to read {}", entries.display()))?;
            let list = entries_from_json(&raw)
                .with_context(|| format!("{} is not an entries JSON array", entries.display()))?;
            let path = render(&list, &doc, &settings)?;
            println!("Wrote {} entries to {}", list.len(), path.display());
            Ok(())
        }
        Commands::Run { input, strategy, doc } => {
            let report = parse_file(&input, strategy.unwrap_or(settings.strategy))?;
            println!("{}", report_summary(&input, &report));
            if report.entries.is_empty() {
                return Ok(());
            }
            let path = render(&report.entries, &doc, &settings)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Batch {
            inputs,
            out_dir,
            strategy,
            font,
            chapters,
        } => {
            if inputs.is_empty() {
                println!("No inputs given.");
                return Ok(());
            }
            let chapters = match chapters {
                Some(path) => load_chapters(&path)?,
                None => Vec::new(),
            };
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let job = BatchJob {
                out_dir,
                strategy: strategy.unwrap_or(settings.strategy),
                font: font.unwrap_or(settings.font),
                chapters,
                placeholder: settings.placeholder.clone(),
            };
            let counts = run_batch(&job, &inputs);
            counts.print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn parse_file(path: &Path, strategy: Strategy) -> Result<ParseReport> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_with(&decode_lossy(&bytes), strategy))
}

fn report_summary(path: &Path, report: &ParseReport) -> String {
    match report.empty_reason() {
        Some(EmptyReason::NoRecognizableMarkers) => {
            format!("{}: no highlight headers or page/location markers found.", path.display())
        }
        Some(EmptyReason::NothingSurvivedFiltering) => format!(
            "{}: {} markers found, but no highlights left after removing metadata.",
            path.display(),
            report.markers_seen
        ),
        None => format!(
            "{}: parsed {} entries ({:?} strategy). Flagged {} as truncated (export limits).",
            path.display(),
            report.entries.len(),
            report.strategy,
            report.truncated_count()
        ),
    }
}

/// Entries JSON goes to `out` when given, otherwise to `stdout` and nothing else.
fn write_entries(entries: &[Entry], out: Option<&Path>, stdout: &mut impl Write) -> Result<()> {
    let json = entries_to_json(entries)?;
    match out {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => writeln!(stdout, "{}", json)?,
    }
    Ok(())
}

fn load_chapters(path: &Path) -> Result<Vec<ChapterMark>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chapters {}", path.display()))?;
    Ok(chapters_from_text(&text))
}

fn render(entries: &[Entry], args: &DocArgs, settings: &Settings) -> Result<PathBuf> {
    let mut chapters = match &args.chapters {
        Some(path) => load_chapters(path)?,
        None => Vec::new(),
    };
    chapters.extend(chapters_from_text(&args.chapter.join("\n")));

    let title = args.title.as_deref().unwrap_or(&settings.title);
    let font = args.font.unwrap_or(settings.font);
    let doc = Assembler::new(title)
        .reading_note(args.note.as_deref())
        .placeholder(&settings.placeholder)
        .assemble(entries, &chapters);
    let bytes = write_docx(&doc, font).context("Failed to build docx")?;

    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(safe_file_name(&doc.title)));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), chapters = chapters.len(), "document written");
    Ok(path)
}

struct BatchJob {
    out_dir: PathBuf,
    strategy: Strategy,
    font: FontChoice,
    chapters: Vec<ChapterMark>,
    placeholder: String,
}

struct BatchCounts {
    files: usize,
    written: usize,
    empty: usize,
    errors: usize,
    entries: usize,
    truncated: usize,
}

impl BatchCounts {
    fn print(&self) {
        println!(
            "Converted {}/{} files ({} empty, {} errors): {} entries, {} truncated.",
            self.written, self.files, self.empty, self.errors, self.entries, self.truncated,
        );
    }
}

enum FileOutcome {
    Written { entries: usize, truncated: usize },
    Empty,
}

fn convert_one(job: &BatchJob, input: &Path) -> Result<FileOutcome> {
    let report = parse_file(input, job.strategy)?;
    if report.entries.is_empty() {
        return Ok(FileOutcome::Empty);
    }

    let title = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let doc = Assembler::new(&title)
        .placeholder(&job.placeholder)
        .assemble(&report.entries, &job.chapters);
    let bytes = write_docx(&doc, job.font)?;
    let path = job.out_dir.join(safe_file_name(&doc.title));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(FileOutcome::Written {
        entries: report.entries.len(),
        truncated: report.truncated_count(),
    })
}

fn run_batch(job: &BatchJob, inputs: &[PathBuf]) -> BatchCounts {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let results: Vec<(&PathBuf, Result<FileOutcome>)> = inputs
        .par_iter()
        .map(|input| {
            let outcome = convert_one(job, input);
            pb.inc(1);
            (input, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = BatchCounts {
        files: inputs.len(),
        written: 0,
        empty: 0,
        errors: 0,
        entries: 0,
        truncated: 0,
    };
    for (input, outcome) in results {
        match outcome {
            Ok(FileOutcome::Written { entries, truncated }) => {
                counts.written += 1;
                counts.entries += entries;
                counts.truncated += truncated;
            }
            Ok(FileOutcome::Empty) => {
                counts.empty += 1;
                info!(input = %input.display(), "no entries found");
            }
            Err(e) => {
                counts.errors += 1;
                warn!(input = %input.display(), "conversion failed: {:#}", e);
            }
        }
    }
    counts
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
