use crate::args::Args;
use crate::mbox::Mailbox;
use crate::message::Message;
use crate::utils;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one run: how many candidate files were seen, appended,
/// and skipped with a diagnostic.
#[derive(Debug, Default)]
pub struct Summary {
    pub processed: usize,
    pub imported: usize,
    pub failed: usize,
}

fn read_message(path: &Path) -> Result<Message> {
    let text = fs::read_to_string(path)?;
    Ok(Message::parse(&text)?)
}

/// Appends every collected file to the mailbox, in order. Decode and
/// parse failures are isolated per file; store failures abort the run.
pub fn import_emails(args: &Args, files: Vec<PathBuf>) -> Result<Summary> {
    let mut mailbox = Mailbox::open_append(&args.mailbox)
        .with_context(|| format!("failed to open mailbox '{}'", args.mailbox.display()))?;

    let progress = utils::create_progress_bar(args, files.len());
    let mut summary = Summary::default();
    for path in files {
        summary.processed += 1;
        match read_message(&path) {
            Ok(message) => {
                mailbox
                    .append(&message)
                    .with_context(|| {
                        format!("failed to append to mailbox '{}'", args.mailbox.display())
                    })?;
                summary.imported += 1;
            }
            Err(err) => {
                let name = path.file_name().unwrap_or(path.as_os_str());
                progress.suspend(|| {
                    eprintln!("Failed to import {}: {:#}", name.to_string_lossy(), err)
                });
                summary.failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    mailbox
        .close()
        .with_context(|| format!("failed to save mailbox '{}'", args.mailbox.display()))?;
    Ok(summary)
}
