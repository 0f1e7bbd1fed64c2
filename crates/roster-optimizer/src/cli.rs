// Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "roster-optimizer")]
#[command(about = "Pick the best-scoring 13 F / 8 D roster that fits under the budget cap")]
pub struct Cli {
    /// Player table (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
    #[arg(env = "ROSTER_INPUT", default_value = "players.xlsx")]
    pub input: PathBuf,

    /// TOML file overriding roster rules, scoring weights or solver limits
    #[arg(short, long, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Give up on the solver after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
