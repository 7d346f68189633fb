use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "mbox-import")]
#[clap(version, about)]
pub struct Args {
    /// Input directory containing .eml message files.
    #[clap(long = "in", value_name = "DIR")]
    pub input_dir: PathBuf,
    /// Output mbox file the messages are appended to, created if missing.
    #[clap(long = "out", value_name = "FILE")]
    pub mailbox: PathBuf,
    /// Suppress any progress output if set.
    #[clap(short, long)]
    pub quiet: bool,
}
