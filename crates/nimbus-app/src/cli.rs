use clap::Parser;

/// Nimbus — a weather assistant in your terminal.
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about)]
pub struct Args {
    /// Model identifier override.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Reasoning effort override (minimal, low, medium, high).
    #[arg(long)]
    pub effort: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print answers whole instead of streaming them.
    #[arg(long)]
    pub no_stream: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
