use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use combirank_analysis::pipeline::{self, DifficultyRanking};

use crate::util::{self, Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RankArg {
    /// Dataset JSON file (combinations, outcomes, distributions)
    dataset: PathBuf,
    /// Analysis configuration JSON file; defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RankArg) -> anyhow::Result<()> {
    let RankArg {
        dataset,
        config,
        format,
        output,
    } = arg;

    let dataset = util::read_dataset_file(dataset)?;
    let config = util::read_config_file(config.as_deref())?;
    let features = pipeline::group_features(&dataset).context("Failed to build group features")?;
    let ranking = pipeline::difficulty_ranking(&features, &config.difficulty)
        .context("Failed to rank groups")?;

    match format {
        Format::Json => Output::save_json(&ranking, output.clone())?,
        Format::Table => {
            let mut output = Output::from_output_path(output.clone())?;
            write_table(&mut output, &ranking)?;
        }
    }
    Ok(())
}

fn write_table(output: &mut Output, ranking: &DifficultyRanking) -> anyhow::Result<()> {
    let group_width = ranking
        .rows
        .iter()
        .map(|row| row.group.len())
        .max()
        .unwrap_or(0)
        .max("GROUP".len());
    let tier_width = ranking
        .rows
        .iter()
        .map(|row| row.tier.len())
        .max()
        .unwrap_or(0)
        .max("TIER".len());

    writeln!(
        output,
        "{:>4}  {:<group_width$}  {:>8}  {:<tier_width$}",
        "RANK", "GROUP", "SCORE", "TIER"
    )?;
    for row in &ranking.rows {
        writeln!(
            output,
            "{:>4}  {:<group_width$}  {:>8.3}  {:<tier_width$}",
            row.rank, row.group, row.score, row.tier
        )?;
    }
    if !ranking.degenerate.is_empty() {
        writeln!(
            output,
            "\nindicators without spread (scored as 0): {}",
            ranking.degenerate.join(", ")
        )?;
    }
    if !ranking.omitted.is_empty() {
        writeln!(
            output,
            "groups not ranked (missing an indicator): {}",
            ranking.omitted.join(", ")
        )?;
    }
    output
        .flush()
        .with_context(|| format!("Failed to flush output to {}", output.display_path()))?;
    Ok(())
}
