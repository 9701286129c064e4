//! Dice implementation.
//!
//! One roll, uniform over 1-6, against a predicted value. An exact match
//! pays a fixed 5x of the bet as winnings; anything else pays nothing.

use std::fmt;

use super::GameRng;
use crate::error::{Error, Result};

/// Winnings multiplier on an exact match.
pub const EXACT_MATCH_MULTIPLIER: u64 = 5;

/// One resolved roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roll {
    pub pick: u8,
    pub rolled: u8,
    pub winnings: u64,
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pick == self.rolled {
            write!(f, "rolled {}: exact match", self.rolled)
        } else {
            write!(f, "rolled {}: picked {}", self.rolled, self.pick)
        }
    }
}

/// Roll the die against a predicted value in 1-6.
pub fn resolve(bet: u64, pick: u8, rng: &mut GameRng) -> Result<Roll> {
    if bet == 0 {
        return Err(Error::InvalidBet { bet });
    }
    if !(1..=6).contains(&pick) {
        return Err(Error::InvalidPrediction {
            got: pick,
            expected: "a value in 1-6",
        });
    }
    let rolled = rng.roll_die();
    let winnings = if rolled == pick {
        bet.saturating_mul(EXACT_MATCH_MULTIPLIER)
    } else {
        0
    };
    Ok(Roll {
        pick,
        rolled,
        winnings,
    })
}
