use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(name = "fpsutil")]
#[command(about = "Very basic network IO counters")]
#[command(long_about = "Samples network counters for all interfaces once per second and appends \
the per-second deltas to netstats<timestamp>.csv in the current directory.")]
pub struct Cli {
    /// Config file (default is $HOME/.fpsutil.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Accepted for compatibility, has no effect
    #[arg(short, long)]
    pub toggle: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
