use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eos-history-api")]
#[command(about = "Read-only HTTP query API over EOS blockchain history", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// HTTP listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// HTTP bind address
    #[arg(short, long)]
    pub bind_address: Option<String>,

    /// History snapshot to serve (JSON object mapping collections to documents)
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

pub fn parse_args() -> Args {
    Args::parse()
}
