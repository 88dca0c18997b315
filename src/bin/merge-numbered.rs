//! merge-numbered CLI tool
//!
//! Merges every PDF in a folder into one file and stamps page numbers on it.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::Path;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use merge_numbered::folder::{
    confirm_default_folder, find_pdf_files, merge_folder, needs_confirmation, resolve_folder,
};
use merge_numbered::pdf::{count_all_pages, NumberingOptions};

/// Merge Numbered - Merge all PDFs in a folder and number the pages
#[derive(Parser)]
#[command(name = "merge-numbered")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge every PDF in a folder into <folder>/merged_numbered.pdf
    merge-numbered \"/home/me/handouts\"

    # Show per-page details while merging
    merge-numbered -v ./scans")]
struct Cli {
    /// Folder containing the PDFs to merge. Without it the built-in
    /// default folder is used, after confirmation.
    folder: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let folder = resolve_folder(cli.folder.as_deref());

    if needs_confirmation(&folder) {
        match confirm_default_folder(io::stdin().lock(), io::stdout()) {
            Ok(true) => {}
            Ok(false) => {
                println!("Cancelled.");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = run(&folder) {
        // Folder problems get the bare message, everything else the full chain
        match e.downcast_ref::<merge_numbered::Error>() {
            Some(err) if err.is_input_error() => eprintln!("Error: {}", err),
            _ => eprintln!("Error: {:#}", e),
        }
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Merge the PDFs of one folder into `<folder>/merged_numbered.pdf`
fn run(folder: &Path) -> Result<()> {
    let inputs = find_pdf_files(folder)
        .with_context(|| format!("Failed to list PDFs in {}", folder.display()))?;
    println!("Files found: {}", inputs.len());

    let counts = count_all_pages(&inputs).context("Failed to count pages")?;
    let total: usize = counts.iter().map(|(_, pages)| pages).sum();
    println!("Total pages to process: {}", total);

    let report = merge_folder(folder, &NumberingOptions::default())
        .with_context(|| format!("Failed to merge PDFs in {}", folder.display()))?;

    println!("Output: {}", report.output_path.display());
    println!("Done! {} pages numbered.", report.total_pages);

    Ok(())
}
