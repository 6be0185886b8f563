use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use tintbook::docx::DocxFile;
use tintbook::palette::load_subject_palette;
use tintbook::recolor::{normalize_fonts, recolor_document};

#[derive(Parser)]
#[command(name = "tintbook")]
#[command(about = "Recolor individual letters of a DOCX book using per-subject color distributions")]
struct Cli {
    /// Subject identifier, e.g. "01" (prompted for when omitted)
    #[arg(short, long)]
    subject: Option<String>,

    /// Book number, e.g. "1" (prompted for when omitted)
    #[arg(short, long)]
    book: Option<String>,

    /// Skip the letter recoloring pass
    #[arg(long)]
    skip_colors: bool,

    /// Replace every run's typeface with this font
    #[arg(long)]
    font: Option<String>,

    /// Font size in points, used together with --font
    #[arg(long, requires = "font", default_value_t = 11.0)]
    size: f32,

    /// Directory containing the book documents
    #[arg(long, default_value = "books")]
    books_dir: PathBuf,

    /// Directory containing the palette and distribution CSV files
    #[arg(long, default_value = "colors")]
    colors_dir: PathBuf,

    /// Output path (defaults to the input name with a _processed suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for the color sampler, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();

    let subject = match cli.subject {
        Some(subject) => subject,
        None => prompt("Subject number: ")?,
    };
    let book = match cli.book {
        Some(book) => book,
        None => prompt("Book number: ")?,
    };

    let input = cli.books_dir.join(format!("sub-{subject}_book{book}.docx"));
    let output = cli.output.unwrap_or_else(|| {
        cli.books_dir
            .join(format!("sub-{subject}_book{book}_processed.docx"))
    });

    let mut package =
        DocxFile::open(&input).with_context(|| format!("failed to open {}", input.display()))?;
    info!(
        paragraphs = package.document.paragraphs().count(),
        "loaded {}",
        input.display()
    );

    if !cli.skip_colors {
        let palette = load_subject_palette(&cli.colors_dir, &subject).with_context(|| {
            format!(
                "failed to load palette for subject {subject} from {}",
                cli.colors_dir.display()
            )
        })?;
        info!(
            set = palette.set.name(),
            letters = palette.letters.len(),
            "palette loaded"
        );

        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let outcome = recolor_document(&mut package.document, &palette, &mut rng)
            .context("recoloring failed")?;
        info!(
            recolored = outcome.recolored,
            isolated = outcome.isolated,
            "recoloring finished"
        );
    }

    if let Some(font) = &cli.font {
        let touched = normalize_fonts(&mut package.document, font, cli.size);
        info!(font = %font, size = cli.size, runs = touched, "font replaced");
    }

    package
        .save(&output)
        .with_context(|| format!("failed to save {}", output.display()))?;
    info!(elapsed = ?started.elapsed(), "done");
    println!("New book saved as {}", output.display());

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}
