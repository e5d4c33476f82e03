//! # Quire CLI
//!
//! Usage:
//!   quire design.xml --content data.json -o layout.json
//!   quire design.json -v

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use quire::image_loader::ImageLibrary;
use quire::{design, InMemoryResolver, LayoutEngine, LayoutInfo, QuireError};

#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Paginate a report design and print its layout")]
struct Args {
    /// Design file (.xml or .json).
    design: PathBuf,

    /// Content data (JSON). Without it every source resolves as missing.
    #[arg(short, long)]
    content: Option<PathBuf>,

    /// Write the layout summary here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory picture files are resolved against. Defaults to the
    /// design file's directory.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Log layout decisions.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), QuireError> {
    let source = fs::read_to_string(&args.design)?;
    let is_xml = args
        .design
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    let design = if is_xml {
        design::from_xml(&source)?
    } else {
        design::from_json(&source)?
    };

    let resolver = match &args.content {
        Some(path) => InMemoryResolver::from_json(&fs::read_to_string(path)?)?,
        None => InMemoryResolver::default(),
    };

    let image_root = args
        .images
        .clone()
        .or_else(|| args.design.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let engine = LayoutEngine::new().with_images(ImageLibrary::new(image_root));

    let generation = engine.generate(&design, &resolver)?;
    let d = &generation.diagnostics;
    if !d.is_clean() {
        warn!(
            "unresolved content: {} resources, {} photos, {} text entries",
            d.missing_resources, d.missing_photos, d.missing_content
        );
    }
    info!("{} pages", generation.pages.len());

    let summary = serde_json::to_string_pretty(&LayoutInfo::from_pages(&generation.pages))?;
    match &args.output {
        Some(path) => {
            fs::write(path, summary)?;
            eprintln!("✓ Wrote {} pages to {}", generation.pages.len(), path.display());
        }
        None => println!("{}", summary),
    }
    Ok(())
}
