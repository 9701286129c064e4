use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    read_string, string_encode_size, write_string, MAX_ID_LENGTH, MAX_LEADERBOARD_ENTRIES,
    MAX_NICKNAME_LENGTH,
};

/// Server leaderboard entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub balance: u64,
    pub rank: u32,
}

impl Write for LeaderboardEntry {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.user_id, writer);
        write_string(&self.name, writer);
        self.balance.write(writer);
        self.rank.write(writer);
    }
}

impl Read for LeaderboardEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            user_id: read_string(reader, MAX_ID_LENGTH)?,
            name: read_string(reader, MAX_NICKNAME_LENGTH)?,
            balance: u64::read(reader)?,
            rank: u32::read(reader)?,
        })
    }
}

impl EncodeSize for LeaderboardEntry {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.user_id)
            + string_encode_size(&self.name)
            + self.balance.encode_size()
            + self.rank.encode_size()
    }
}

/// Per-server wealth leaderboard, maintained incrementally on every
/// balance-affecting commit.
///
/// Entries stay sorted descending by balance. On equal balances the earlier
/// entry keeps the better rank, so update order is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Re-rank a user after a balance change, keeping at most `capacity`
    /// entries.
    pub fn update(&mut self, user_id: &str, name: String, balance: u64, capacity: usize) {
        if let Some(idx) = self.entries.iter().position(|e| e.user_id == user_id) {
            self.entries.remove(idx);
        }

        // Skip if the board is full and the balance does not beat the tail.
        if self.entries.len() >= capacity {
            if let Some(last) = self.entries.last() {
                if balance <= last.balance {
                    return;
                }
            }
        }

        // Insert after all entries with a greater-or-equal balance.
        let insert_pos = self.entries.partition_point(|e| e.balance >= balance);
        self.entries.insert(
            insert_pos,
            LeaderboardEntry {
                user_id: user_id.to_string(),
                name,
                balance,
                rank: 0,
            },
        );

        self.entries.truncate(capacity);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
    }

    /// Drop a user from the board (opt-out or deletion).
    pub fn remove(&mut self, user_id: &str) {
        if let Some(idx) = self.entries.iter().position(|e| e.user_id == user_id) {
            self.entries.remove(idx);
            for (i, entry) in self.entries.iter_mut().enumerate() {
                entry.rank = (i + 1) as u32;
            }
        }
    }
}

impl Write for Leaderboard {
    fn write(&self, writer: &mut impl BufMut) {
        (self.entries.len() as u32).write(writer);
        for entry in &self.entries {
            entry.write(writer);
        }
    }
}

impl Read for Leaderboard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let count = u32::read(reader)? as usize;
        if count > MAX_LEADERBOARD_ENTRIES {
            return Err(Error::Invalid("Leaderboard", "too many entries"));
        }
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(LeaderboardEntry::read(reader)?);
        }
        Ok(Self { entries })
    }
}

impl EncodeSize for Leaderboard {
    fn encode_size(&self) -> usize {
        4 + self.entries.iter().map(|e| e.encode_size()).sum::<usize>()
    }
}
