mod args;
mod collect;
mod datetime;
mod import;
mod mbox;
mod message;
mod utils;

use crate::args::Args;
use anyhow::{ensure, Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    do_main(&Args::parse())
}

fn do_main(args: &Args) -> Result<()> {
    ensure!(
        args.input_dir.is_dir(),
        "input directory '{}' does not exist",
        args.input_dir.display()
    );

    eprintln!("Listing emails...");
    let files = collect::list_message_files(&args.input_dir)
        .with_context(|| format!("failed to list '{}'", args.input_dir.display()))?;

    eprintln!("Importing emails...");
    let summary = import::import_emails(args, files)?;
    if summary.failed > 0 {
        eprintln!(
            "Imported {} of {} files; {} could not be imported.",
            summary.imported, summary.processed, summary.failed
        );
    }

    println!("Imported emails into '{}'.", args.mailbox.display());
    Ok(())
}
