use std::path::PathBuf;

use chrono::Utc;
use stackpilot_ai::{player::RandomPlayer, session::play_session};
use stackpilot_engine::{GameField, PieceSeed};
use tracing::info;

use crate::{
    schema::report::{GameReport, PlayerKind, RunReport, ScoreSummary},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Seed of the first game; game `i` uses `seed + i` (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of turns per game
    #[arg(long, default_value_t = 1000)]
    turn_limit: usize,
    /// Path to the engine config file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Player driving the games: engine or random
    #[arg(long, default_value = "engine")]
    player: PlayerKind,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        games: game_count,
        seed,
        turn_limit,
        config,
        player,
        output,
    } = arg;

    let started_at = Utc::now();
    let base_seed = seed.unwrap_or_else(rand::random);
    let config = match player {
        PlayerKind::Engine => Some(util::read_config_file(config.as_deref())?),
        PlayerKind::Random => None,
    };
    info!(base_seed, ?player, "starting auto-play");

    let mut games = Vec::with_capacity(*game_count);
    for game in 0..*game_count {
        let game_seed = base_seed.wrapping_add(game as u64);
        let seed = PieceSeed::from_u64(game_seed);
        let mut field = GameField::new(seed);
        let result = match &config {
            Some(config) => {
                let mut engine = config.build()?;
                play_session(&mut field, &mut engine, *turn_limit)
            }
            None => {
                let mut random = RandomPlayer::new(game_seed);
                play_session(&mut field, &mut random, *turn_limit)
            }
        };
        eprintln!(
            "Game #{game}: score {} after {} turns ({} lines{})",
            result.score,
            result.turns,
            result.stats.total_cleared_lines(),
            if result.topped_out { ", topped out" } else { "" },
        );
        games.push(GameReport {
            game,
            seed,
            score: result.score,
            turns: result.turns,
            topped_out: result.topped_out,
            stats: result.stats,
        });
    }

    let summary = ScoreSummary::from_games(&games);
    if let Some(summary) = &summary {
        eprintln!(
            "Score: min {} / max {} / mean {:.1}",
            summary.min, summary.max, summary.mean
        );
    }

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        player: *player,
        config,
        base_seed,
        turn_limit: *turn_limit,
        games,
        summary,
    };
    Output::save_json(&report, output.as_deref())
}
