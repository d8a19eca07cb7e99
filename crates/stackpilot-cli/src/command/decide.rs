use std::path::PathBuf;

use serde::Serialize;
use stackpilot_ai::board_contract::Board as _;
use stackpilot_engine::Action;
use tracing::info;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DecideArg {
    /// Path to the board file (JSON format)
    #[arg(long)]
    board: PathBuf,
    /// Path to the engine config file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Decision {
    actions: Vec<Action>,
}

pub(crate) fn run(arg: &DecideArg) -> anyhow::Result<()> {
    let DecideArg {
        board,
        config,
        output,
    } = arg;
    let config = util::read_config_file(config.as_deref())?;
    let field = util::read_board_file(board)?.into_field()?;

    let mut engine = config.build()?;
    let actions = engine.choose_action(&field);
    info!(
        width = field.width(),
        height = field.height(),
        actions = actions.len(),
        "decided"
    );
    Output::save_json(&Decision { actions }, output.as_deref())
}
