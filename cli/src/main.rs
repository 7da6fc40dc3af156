//! pdfweave CLI - PDF page asset extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use pdfweave::{
    DocumentSource, GridClassifier, LopdfSource, PageRange, Pipeline, PipelineOptions,
    ProcessReport,
};

#[derive(Parser)]
#[command(name = "pdfweave")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Split PDF pages into SVG, raster, CSV and text assets",
    long_about = None
)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    process: ProcessArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process pages into assets and an assembled document
    Process {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: ProcessArgs,
    },

    /// Show per-page drawing, image and table counts
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-13", "4")
        #[arg(long)]
        pages: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct ProcessArgs {
    /// Output directory (defaults to <FILE stem>_output)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Page range (e.g., "1-13", "4", "all")
    #[arg(long)]
    pages: Option<String>,

    /// JSON file with pipeline options; flags override its values
    #[arg(long, value_name = "FILE", env = "PDFWEAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum lines per axis for a table grid
    #[arg(long)]
    min_lines: Option<usize>,

    /// Alignment tolerance in points
    #[arg(long)]
    tolerance: Option<f32>,

    /// Minimum element count for an SVG file to be written
    #[arg(long)]
    min_elements: Option<usize>,

    /// Maximum vertical gap between raster fragments of one figure
    #[arg(long)]
    max_gap: Option<f32>,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Skip table wireframe SVG files
    #[arg(long)]
    no_wireframes: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl ProcessArgs {
    /// Build pipeline options: config file first, then flags.
    fn options(&self) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => PipelineOptions::from_json_file(path)?,
            None => PipelineOptions::new(),
        };

        if let Some(p) = &self.pages {
            if let Some(range) = PageRange::parse(p)? {
                options = options.with_pages(range);
            }
        }
        if let Some(min_lines) = self.min_lines {
            options = options.with_min_lines(min_lines);
        }
        if let Some(tolerance) = self.tolerance {
            options = options.with_tolerance(tolerance);
        }
        if let Some(min) = self.min_elements {
            options = options.with_min_vector_elements(min);
        }
        if let Some(gap) = self.max_gap {
            options = options.with_max_merge_gap(gap);
        }
        if self.sequential {
            options = options.sequential();
        }
        if self.no_wireframes {
            options = options.with_wireframes(false);
        }

        options.validate()?;
        log::debug!("Pipeline options: {:?}", options);
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Process { input, args }) => cmd_process(&input, &args),
        Some(Commands::Info { input, pages, json }) => cmd_info(&input, pages.as_deref(), json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: process if input is provided
            if let Some(input) = cli.input {
                cmd_process(&input, &cli.process)
            } else {
                println!("{}", "Usage: pdfweave <FILE> [-o DIR]".yellow());
                println!("       pdfweave --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_output", stem))
}

fn cmd_process(input: &Path, args: &ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options()?;
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;
    log::info!("Writing assets to {}", output_dir.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    pb.set_message("Opening PDF...");
    let source = LopdfSource::open(input)?;

    pb.set_message(format!("Processing {} pages...", source.page_count()));
    let report = Pipeline::new(&output_dir)?
        .with_options(options)
        .run(&source);
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &output_dir);
    }

    Ok(())
}

fn print_report(report: &ProcessReport, output_dir: &Path) {
    println!("{} {}", "Done!".green().bold(), output_dir.display());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Pages".bold(), report.page_count());
    println!("{}: {}", "Grid-bearing pages".bold(), report.grid_bearing_pages());
    println!("{}: {}", "Merged figures".bold(), report.merged_pages());
    if report.suppressed_renders() > 0 {
        println!(
            "{}: {}",
            "Suppressed renders".bold(),
            report.suppressed_renders()
        );
    }
    println!("{}: {}", "Assets".bold(), report.asset_count());

    println!("\n{}", "Output files:".green().bold());
    if let Some(table) = &report.table {
        println!(
            "  {} {} ({} rows)",
            "├─".dimmed(),
            file_name(&table.path),
            table.rows
        );
    }
    for page in &report.pages {
        for path in page.images.iter().chain(page.vectors.iter()) {
            println!("  {} {}", "├─".dimmed(), file_name(path));
        }
    }
    println!("  {} {}", "└─".dimmed(), file_name(&report.document));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_info(
    input: &Path,
    pages: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = LopdfSource::open(input)?;
    let page_count = source.page_count();
    let range = match pages.map(PageRange::parse).transpose()?.flatten() {
        Some(range) => {
            range.validate(page_count)?;
            Some(range)
        }
        None => PageRange::all(page_count),
    };

    let classifier = GridClassifier::new();
    let mut rows = Vec::new();
    for index in range.iter().flat_map(PageRange::iter) {
        let page = source.load_page(index)?;
        let classification = classifier.classify(&page.drawings);
        rows.push(json!({
            "page": page.number(),
            "width": page.width,
            "height": page.height,
            "drawings": page.drawings.len(),
            "structural": classification.structural.len(),
            "illustrative": classification.illustrative.len(),
            "grid_bearing": classification.grid_bearing,
            "images": page.images.len(),
            "tables": page.tables.len(),
            "text_chars": page.text.chars().count(),
        }));
    }

    if json {
        let info = json!({
            "file": input.display().to_string(),
            "version": source.version(),
            "page_count": page_count,
            "pages": rows,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), source.version());
    println!("{}: {}", "Pages".bold(), page_count);

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for row in &rows {
        let verdict = if row["grid_bearing"].as_bool().unwrap_or(false) {
            "grid".green()
        } else {
            "no grid".dimmed()
        };
        println!(
            "{:>4}  {} drawings ({} structural), {} images, {} tables  {}",
            row["page"],
            row["drawings"],
            row["structural"],
            row["images"],
            row["tables"],
            verdict
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfweave".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page asset extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("options.json");
        fs::write(
            &config,
            r#"{"max_merge_gap": 20.0, "min_vector_elements": 4, "classifier": {"min_lines": 5}}"#,
        )
        .unwrap();

        let args = ProcessArgs {
            config: Some(config),
            min_lines: Some(2),
            pages: Some("2-3".to_string()),
            sequential: true,
            ..Default::default()
        };
        let options = args.options().unwrap();

        assert_eq!(options.classifier.min_lines, 2);
        assert_eq!(options.max_merge_gap, 20.0);
        assert_eq!(options.min_vector_elements, 4);
        assert_eq!(options.pages, Some(PageRange::new(1, 2).unwrap()));
        assert!(!options.parallel);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let args = ProcessArgs {
            max_gap: Some(-1.0),
            ..Default::default()
        };
        assert!(args.options().is_err());

        let args = ProcessArgs {
            pages: Some("0-2".to_string()),
            ..Default::default()
        };
        assert!(args.options().is_err());
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("docs/report.pdf")),
            PathBuf::from("report_output")
        );
    }

    #[test]
    fn test_cli_parses_default_and_subcommand() {
        let cli =
            Cli::try_parse_from(["pdfweave", "doc.pdf", "-o", "out", "--sequential"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("doc.pdf")));
        assert_eq!(cli.process.output, Some(PathBuf::from("out")));
        assert!(cli.process.sequential);

        let cli = Cli::try_parse_from(["pdfweave", "info", "doc.pdf", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Info { json: true, .. })));
    }
}
