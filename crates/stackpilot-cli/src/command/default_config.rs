use std::path::PathBuf;

use stackpilot_ai::config::{EngineConfig, SelectorConfig};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DefaultConfigArg {
    /// Start from the weighted-sum selector instead of the cascade
    #[arg(long)]
    weighted_sum: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DefaultConfigArg) -> anyhow::Result<()> {
    let DefaultConfigArg {
        weighted_sum,
        output,
    } = arg;
    let mut config = EngineConfig::default();
    if *weighted_sum {
        config.selector = SelectorConfig::default_weighted_sum();
    }
    Output::save_json(&config, output.as_deref())
}
