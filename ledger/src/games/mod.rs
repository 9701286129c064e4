//! Gambling game resolution.
//!
//! Each game is a pure function over a bet, game-specific parameters, and a
//! [`GameRng`]: same seed, same outcome. Resolution never touches balances;
//! the caller folds `winnings - bet` into a single `record_game` call so the
//! debit and credit land in one commit.

pub mod coinflip;
pub mod dice;
pub mod slots;

use commonware_cryptography::{sha256::Sha256, Hasher};
use rand::{rngs::OsRng, RngCore};

/// Deterministic random number generator seeded by the caller.
///
/// Uses SHA256 hash chains to derive uniform draws from a 32-byte seed and a
/// round counter, so a recorded seed replays to the same outcome.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed and a round counter.
    pub fn new(seed: &[u8; 32], round: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(&round.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    /// Create a new RNG from OS entropy, for live play.
    pub fn from_entropy() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::new(&seed, 0)
    }

    /// Get the next random byte.
    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    /// Get a random u8 value.
    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Simple rejection sampling for unbiased distribution
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Roll a single die (1-6).
    pub fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_rng_deterministic() {
        let seed = [7u8; 32];

        let mut rng1 = GameRng::new(&seed, 1);
        let mut rng2 = GameRng::new(&seed, 1);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u8(), rng2.next_u8());
        }
    }

    #[test]
    fn test_game_rng_different_rounds() {
        let seed = [7u8; 32];

        let mut rng1 = GameRng::new(&seed, 1);
        let mut rng2 = GameRng::new(&seed, 2);

        // Different rounds should produce different sequences
        let seq1: Vec<u8> = (0..10).map(|_| rng1.next_u8()).collect();
        let seq2: Vec<u8> = (0..10).map(|_| rng2.next_u8()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_game_rng_bounded() {
        let seed = [1u8; 32];
        let mut rng = GameRng::new(&seed, 0);

        // Test bounded values are in range
        for _ in 0..1000 {
            let value = rng.next_bounded(6);
            assert!(value < 6);
        }
    }

    #[test]
    fn test_game_rng_dice() {
        let seed = [2u8; 32];
        let mut rng = GameRng::new(&seed, 0);

        // Test die rolls are in range
        for _ in 0..1000 {
            let roll = rng.roll_die();
            assert!((1..=6).contains(&roll));
        }
    }
}
