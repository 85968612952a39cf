use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, rank::RankArg};

mod analyze;
mod rank;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log per-component details (omitted groups, degenerate indicators)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run every analysis and write the report as JSON
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Print the difficulty ranking
    Rank(#[clap(flatten)] RankArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::init_tracing(args.verbose);
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Rank(arg) => rank::run(&arg)?,
    }
    Ok(())
}
