//! Picking one winner among equally ranked candidates.

use rand::{SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// How to choose among candidates the selector could not separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "policy")]
pub enum TieBreak {
    /// The earliest candidate in enumeration order.
    #[default]
    First,
    /// A uniformly random candidate from a generator seeded once.
    Seeded { seed: u64 },
}

/// Stateful tie-break: a seeded policy keeps drawing from one generator, so
/// a whole game is reproducible from the seed.
#[derive(Debug, Clone)]
pub struct TieBreaker {
    rng: Option<Pcg32>,
}

impl TieBreaker {
    #[must_use]
    pub fn new(policy: TieBreak) -> Self {
        let rng = match policy {
            TieBreak::First => None,
            TieBreak::Seeded { seed } => Some(Pcg32::seed_from_u64(seed)),
        };
        Self { rng }
    }

    /// Picks one of `indices`; `None` only when `indices` is empty.
    pub fn pick(&mut self, indices: &[usize]) -> Option<usize> {
        match &mut self.rng {
            Some(rng) if indices.len() > 1 => indices.choose(rng).copied(),
            _ => indices.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_policy() {
        let mut tie_breaker = TieBreaker::new(TieBreak::First);
        assert_eq!(tie_breaker.pick(&[3, 5, 8]), Some(3));
        assert_eq!(tie_breaker.pick(&[]), None);
    }

    #[test]
    fn test_seeded_policy_is_reproducible() {
        let draws = |seed| {
            let mut tie_breaker = TieBreaker::new(TieBreak::Seeded { seed });
            (0..32)
                .map(|_| tie_breaker.pick(&[1, 2, 3, 4]).unwrap())
                .collect::<Vec<_>>()
        };
        let first = draws(11);
        assert_eq!(first, draws(11));
        assert!(first.iter().all(|i| (1..=4).contains(i)));
        assert!(first.iter().any(|&i| i != first[0]));
    }

    #[test]
    fn test_seeded_policy_singleton() {
        let mut tie_breaker = TieBreaker::new(TieBreak::Seeded { seed: 1 });
        assert_eq!(tie_breaker.pick(&[9]), Some(9));
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&TieBreak::Seeded { seed: 7 }).unwrap();
        assert_eq!(json, r#"{"policy":"seeded","seed":7}"#);
        let policy: TieBreak = serde_json::from_str(r#"{"policy":"first"}"#).unwrap();
        assert_eq!(policy, TieBreak::First);
    }
}
