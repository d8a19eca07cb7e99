use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackpilot_ai::config::EngineConfig;
use stackpilot_engine::{GameStats, PieceSeed};

/// Result of an `auto-play` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started (ISO 8601)
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub player: PlayerKind,
    /// Engine configuration, for engine runs
    pub config: Option<EngineConfig>,
    pub base_seed: u64,
    pub turn_limit: usize,
    pub games: Vec<GameReport>,
    pub summary: Option<ScoreSummary>,
}

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerKind {
    #[default]
    Engine,
    Random,
}

/// Outcome of one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub game: usize,
    /// Seed of the piece sequence
    pub seed: PieceSeed,
    pub score: usize,
    pub turns: usize,
    pub topped_out: bool,
    pub stats: GameStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl ScoreSummary {
    /// `None` for an empty run.
    #[must_use]
    pub fn from_games(games: &[GameReport]) -> Option<Self> {
        let min = games.iter().map(|g| g.score).min()?;
        let max = games.iter().map(|g| g.score).max()?;
        let total: usize = games.iter().map(|g| g.score).sum();
        #[expect(clippy::cast_precision_loss)]
        let mean = total as f64 / games.len() as f64;
        Some(Self { min, max, mean })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(game: usize, score: usize) -> GameReport {
        GameReport {
            game,
            seed: PieceSeed::from_u64(game as u64),
            score,
            turns: 10,
            topped_out: false,
            stats: GameStats::with_score(score),
        }
    }

    #[test]
    fn test_score_summary() {
        let games = [game(0, 300), game(1, 100), game(2, 800)];
        let summary = ScoreSummary::from_games(&games).unwrap();
        assert_eq!((summary.min, summary.max), (100, 800));
        assert!((summary.mean - 400.0).abs() < f64::EPSILON);
        assert!(ScoreSummary::from_games(&[]).is_none());
    }

    #[test]
    fn test_player_kind_from_str() {
        assert_eq!("engine".parse::<PlayerKind>().unwrap(), PlayerKind::Engine);
        assert_eq!("random".parse::<PlayerKind>().unwrap(), PlayerKind::Random);
        assert!("human".parse::<PlayerKind>().is_err());
    }
}
