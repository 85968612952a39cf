use std::path::PathBuf;

use anyhow::Context;
use combirank_analysis::pipeline;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Dataset JSON file (combinations, outcomes, distributions)
    dataset: PathBuf,
    /// Analysis configuration JSON file; defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let AnalyzeArg {
        dataset,
        config,
        output,
    } = arg;

    let dataset = util::read_dataset_file(dataset)?;
    let config = util::read_config_file(config.as_deref())?;
    let report = pipeline::run(&dataset, &config).context("Analysis failed")?;

    Output::save_json(&report, output.clone())?;
    if let Some(path) = output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}
