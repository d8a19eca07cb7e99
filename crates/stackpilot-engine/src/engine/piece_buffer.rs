use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// How a [`PieceBuffer`] produces new pieces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PieceGeneration {
    /// Shuffled bags containing each of the 7 pieces once.
    #[default]
    SevenBag,
    /// Every piece drawn independently and uniformly.
    Uniform,
}

#[derive(Debug, Clone)]
enum PieceSource {
    SevenBag(Pcg32),
    Uniform(Pcg32),
    Scripted,
}

/// Queue of upcoming pieces.
///
/// Random buffers never run dry. A scripted buffer (see
/// [`PieceBuffer::scripted`]) yields exactly the given pieces and then
/// reports exhaustion, which fixtures use to control the preview.
///
/// # Example
///
/// ```
/// use stackpilot_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u64(7));
///
/// let first = buffer.pop_next();
/// let upcoming: Vec<_> = buffer.next_pieces().take(5).collect();
/// assert!(first.is_some());
/// assert_eq!(upcoming.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    source: PieceSource,
    queue: VecDeque<PieceKind>,
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator for piece generation. The same seed always produces the same
/// sequence of pieces, so games can be replayed and tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    /// Expands a small integer seed, convenient for command-line use.
    #[must_use]
    pub fn from_u64(seed: u64) -> Self {
        Self(u128::from(seed).to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a 7-bag buffer.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_generation(seed, PieceGeneration::SevenBag)
    }

    #[must_use]
    pub fn with_generation(seed: PieceSeed, generation: PieceGeneration) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let source = match generation {
            PieceGeneration::SevenBag => PieceSource::SevenBag(rng),
            PieceGeneration::Uniform => PieceSource::Uniform(rng),
        };
        let mut this = Self {
            source,
            queue: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_queue();
        this
    }

    /// Creates a buffer that yields exactly `pieces`, in order.
    #[must_use]
    pub fn scripted<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Self {
            source: PieceSource::Scripted,
            queue: pieces.into_iter().collect(),
        }
    }

    /// Tops up the queue so at least one piece stays previewable after a pop.
    fn fill_queue(&mut self) {
        match &mut self.source {
            PieceSource::SevenBag(rng) => {
                while self.queue.len() <= PieceKind::LEN {
                    let mut new_bag = PieceKind::ALL;
                    new_bag.shuffle(rng);
                    self.queue.extend(new_bag);
                }
            }
            PieceSource::Uniform(rng) => {
                while self.queue.len() < 2 {
                    self.queue.push_back(rng.random());
                }
            }
            PieceSource::Scripted => {}
        }
    }

    /// Draws the next piece; `None` only once a scripted buffer is exhausted.
    pub fn pop_next(&mut self) -> Option<PieceKind> {
        self.fill_queue();
        let piece = self.queue.pop_front();
        self.fill_queue();
        piece
    }

    #[must_use]
    pub fn peek_next(&self) -> Option<PieceKind> {
        self.queue.front().copied()
    }

    /// Returns an iterator over the upcoming pieces in the queue.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}
