//! Slot machine implementation.
//!
//! Three symbols are drawn independently from a fixed six-symbol reel.
//! Three of a kind pays the symbol's own multiplier, any two of a kind pays
//! a flat 2x, no match pays nothing. Multipliers rise with symbol rarity
//! tier so three sevens is always the best line on the machine.

use std::fmt;

use super::GameRng;
use crate::error::{Error, Result};

/// Flat multiplier for any two matching symbols.
pub const TWO_OF_A_KIND_MULTIPLIER: u64 = 2;

/// Reel symbols, lowest payout tier first.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Cherry = 0,
    Lemon = 1,
    Bell = 2,
    Bar = 3,
    Diamond = 4,
    Seven = 5,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Bell,
        Symbol::Bar,
        Symbol::Diamond,
        Symbol::Seven,
    ];

    /// Multiplier paid for three of this symbol.
    pub fn multiplier(&self) -> u64 {
        match self {
            Symbol::Cherry => 4,
            Symbol::Lemon => 6,
            Symbol::Bell => 10,
            Symbol::Bar => 15,
            Symbol::Diamond => 25,
            Symbol::Seven => 50,
        }
    }

    fn draw(rng: &mut GameRng) -> Self {
        Self::ALL[rng.next_bounded(Self::ALL.len() as u8) as usize]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Symbol::Cherry => "Cherry",
            Symbol::Lemon => "Lemon",
            Symbol::Bell => "Bell",
            Symbol::Bar => "Bar",
            Symbol::Diamond => "Diamond",
            Symbol::Seven => "Seven",
        };
        f.write_str(name)
    }
}

/// One resolved spin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spin {
    pub reels: [Symbol; 3],
    pub winnings: u64,
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.reels;
        if a == b && b == c {
            write!(f, "{a} {b} {c}: three of a kind")
        } else if a == b || b == c || a == c {
            write!(f, "{a} {b} {c}: two of a kind")
        } else {
            write!(f, "{a} {b} {c}: no match")
        }
    }
}

/// Winnings for a line of reels at the given bet.
pub fn payout(reels: &[Symbol; 3], bet: u64) -> u64 {
    let [a, b, c] = reels;
    if a == b && b == c {
        bet.saturating_mul(a.multiplier())
    } else if a == b || b == c || a == c {
        bet.saturating_mul(TWO_OF_A_KIND_MULTIPLIER)
    } else {
        0
    }
}

/// Spin the reels for a bet.
pub fn resolve(bet: u64, rng: &mut GameRng) -> Result<Spin> {
    if bet == 0 {
        return Err(Error::InvalidBet { bet });
    }
    let reels = [
        Symbol::draw(rng),
        Symbol::draw(rng),
        Symbol::draw(rng),
    ];
    Ok(Spin {
        winnings: payout(&reels, bet),
        reels,
    })
}
