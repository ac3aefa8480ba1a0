use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use intel_report::index::IndexEntry;
use intel_report::{Config, ReportMetadata, ThemePreset, output};

#[derive(Parser)]
#[command(name = "intel-report")]
#[command(about = "Render markdown intelligence reports as PDF documents and mobile web pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the paginated PDF report
    Pdf {
        #[command(flatten)]
        report: ReportArgs,

        /// Write the Typst source instead of compiling it
        #[arg(long)]
        typst: bool,
    },
    /// Render the collapsible web report
    Html {
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Print the parsed blocks as JSON
    Blocks {
        /// Input Markdown file
        input: PathBuf,
    },
    /// Write index.html and manifest.json for a set of web reports
    Index {
        /// Metadata files of the reports to list
        #[arg(required = true)]
        meta: Vec<PathBuf>,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        theme: ThemeArgs,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Input Markdown file
    input: PathBuf,

    /// Report metadata (TOML)
    #[arg(short, long)]
    meta: PathBuf,

    /// Directory for the rendered file
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    theme: ThemeArgs,
}

#[derive(Args)]
struct ThemeArgs {
    /// Built-in theme
    #[arg(long, value_enum, default_value_t = ThemePreset::Consulting)]
    theme: ThemePreset,

    /// Theme file; replaces the built-in theme
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ThemeArgs {
    fn load(&self) -> Result<Config, Box<dyn Error>> {
        match &self.config {
            Some(path) => Ok(Config::load(path)?),
            None => Ok(Config::preset(self.theme)),
        }
    }
}

fn read_markdown(path: &Path) -> Result<String, Box<dyn Error>> {
    fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path.display(), e).into())
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Pdf { report, typst } => {
            let markdown = read_markdown(&report.input)?;
            let meta = ReportMetadata::load(&report.meta)?;
            let config = report.theme.load()?;
            let path = if typst {
                output::write_typst(&markdown, &meta, &config, &report.output_dir)?
            } else {
                output::write_pdf(&markdown, &meta, &config, &report.output_dir)?
            };
            println!("Created {}", path.display());
        }
        Command::Html { report } => {
            let markdown = read_markdown(&report.input)?;
            let meta = ReportMetadata::load(&report.meta)?;
            let config = report.theme.load()?;
            let path = output::write_html(&markdown, &meta, &config, &report.output_dir)?;
            println!("Created {}", path.display());
        }
        Command::Blocks { input } => {
            let markdown = read_markdown(&input)?;
            let blocks = intel_report::parse(&markdown);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Index {
            meta,
            output_dir,
            theme,
        } => {
            let entries = meta
                .iter()
                .map(|path| ReportMetadata::load(path).map(|m| IndexEntry::from_metadata(&m)))
                .collect::<Result<Vec<_>, _>>()?;
            let config = theme.load()?;
            let (index, manifest) = output::write_index(&entries, &config, &output_dir)?;
            println!("Created {}", index.display());
            println!("Created {}", manifest.display());
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "intel_report=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
