use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use tcb_fetch::utils::format_elapsed;
use tcb_fetch::{ChapterAssembler, SiteConfig, logger, selection};

/// Download One Piece chapters from TCB Scans, one PDF per chapter.
#[derive(Parser)]
#[command(name = "tcb-fetch", version)]
struct Cli {
    /// Comma separated chapter numbers you want to download. Ranges are
    /// supported, e.g. `1,2,3,4` or `1000,1005,1070-1077`.
    chapters: String,

    /// Output path for the downloaded chapters.
    #[arg(short, long, default_value = "chapters")]
    output: PathBuf,

    /// Site configuration file. Defaults to the built-in TCB Scans config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    });

    let chapters = selection::parse(&cli.chapters)?;
    let site = match &cli.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::builtin()?,
    };
    debug!(site = %site.name, "configuration loaded");

    println!("Downloading chapters:");
    for chapter in &chapters {
        println!("▶️ {}", chapter);
    }

    let start = Instant::now();
    let assembler = ChapterAssembler::new(site, cli.output)?;
    let paths = assembler.run(&chapters).await?;

    for path in &paths {
        println!("📄 {}", path.display());
    }
    println!("✅ Done in {}", format_elapsed(start.elapsed()));
    Ok(())
}
