use std::collections::BTreeMap;

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    read_string, string_encode_size, write_string, MAX_ID_LENGTH, MAX_NICKNAME_LENGTH,
    MAX_SERVERS_PER_USER, MAX_TAG_LENGTH,
};

/// Per-user display preferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    /// Show the nickname instead of the raw user id in rankings.
    pub display_nickname: bool,
    /// Whether the user appears on server leaderboards at all.
    pub show_in_leaderboards: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            display_nickname: true,
            show_in_leaderboards: true,
        }
    }
}

impl Write for Preferences {
    fn write(&self, writer: &mut impl BufMut) {
        self.display_nickname.write(writer);
        self.show_in_leaderboards.write(writer);
    }
}

impl Read for Preferences {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            display_nickname: bool::read(reader)?,
            show_in_leaderboards: bool::read(reader)?,
        })
    }
}

impl EncodeSize for Preferences {
    fn encode_size(&self) -> usize {
        self.display_nickname.encode_size() + self.show_in_leaderboards.encode_size()
    }
}

/// Cumulative wagering counters for one user on one server.
///
/// `total_wagered`, `total_won`, and `games_played` only ever increase;
/// `biggest_win` is a running maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GamblingStats {
    pub total_wagered: u64,
    pub total_won: u64,
    pub games_played: u64,
    pub biggest_win: u64,
    pub last_played: u64,
}

impl GamblingStats {
    /// Fold one settled wager into the counters.
    pub fn record(&mut self, bet: u64, winnings: u64, now: u64) {
        self.total_wagered = self.total_wagered.saturating_add(bet);
        self.total_won = self.total_won.saturating_add(winnings);
        self.games_played = self.games_played.saturating_add(1);
        self.biggest_win = self.biggest_win.max(winnings);
        self.last_played = now;
    }
}

impl Write for GamblingStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_wagered.write(writer);
        self.total_won.write(writer);
        self.games_played.write(writer);
        self.biggest_win.write(writer);
        self.last_played.write(writer);
    }
}

impl Read for GamblingStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            total_wagered: u64::read(reader)?,
            total_won: u64::read(reader)?,
            games_played: u64::read(reader)?,
            biggest_win: u64::read(reader)?,
            last_played: u64::read(reader)?,
        })
    }
}

impl EncodeSize for GamblingStats {
    fn encode_size(&self) -> usize {
        self.total_wagered.encode_size()
            + self.total_won.encode_size()
            + self.games_played.encode_size()
            + self.biggest_win.encode_size()
            + self.last_played.encode_size()
    }
}

/// One user's state on one server.
///
/// The balance never goes below zero; `clan_tag` is either absent or the tag
/// of a clan on the same server that lists this user as a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerState {
    pub balance: u64,
    pub clan_tag: Option<String>,
    pub joined_at: u64,
    pub is_active: bool,
    pub stats: GamblingStats,
}

impl ServerState {
    pub fn new(joined_at: u64, starting_balance: u64) -> Self {
        Self {
            balance: starting_balance,
            clan_tag: None,
            joined_at,
            is_active: true,
            stats: GamblingStats::default(),
        }
    }
}

impl Write for ServerState {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        match &self.clan_tag {
            Some(tag) => {
                true.write(writer);
                write_string(tag, writer);
            }
            None => false.write(writer),
        }
        self.joined_at.write(writer);
        self.is_active.write(writer);
        self.stats.write(writer);
    }
}

impl Read for ServerState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let balance = u64::read(reader)?;
        let clan_tag = if bool::read(reader)? {
            Some(read_string(reader, MAX_TAG_LENGTH)?)
        } else {
            None
        };
        Ok(Self {
            balance,
            clan_tag,
            joined_at: u64::read(reader)?,
            is_active: bool::read(reader)?,
            stats: GamblingStats::read(reader)?,
        })
    }
}

impl EncodeSize for ServerState {
    fn encode_size(&self) -> usize {
        self.balance.encode_size()
            + 1
            + self.clan_tag.as_deref().map_or(0, string_encode_size)
            + self.joined_at.encode_size()
            + self.is_active.encode_size()
            + self.stats.encode_size()
    }
}

/// One user across all servers. Keyed in the store by the user id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub nickname: String,
    pub registered_at: u64,
    pub last_seen: u64,
    pub preferences: Preferences,
    pub servers: BTreeMap<String, ServerState>,
}

impl UserRecord {
    pub fn new(nickname: String, now: u64) -> Self {
        Self {
            nickname,
            registered_at: now,
            last_seen: now,
            preferences: Preferences::default(),
            servers: BTreeMap::new(),
        }
    }
}

impl Write for UserRecord {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.nickname, writer);
        self.registered_at.write(writer);
        self.last_seen.write(writer);
        self.preferences.write(writer);
        (self.servers.len() as u32).write(writer);
        for (server_id, state) in &self.servers {
            write_string(server_id, writer);
            state.write(writer);
        }
    }
}

impl Read for UserRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nickname = read_string(reader, MAX_NICKNAME_LENGTH)?;
        let registered_at = u64::read(reader)?;
        let last_seen = u64::read(reader)?;
        let preferences = Preferences::read(reader)?;
        let count = u32::read(reader)? as usize;
        if count > MAX_SERVERS_PER_USER {
            return Err(Error::Invalid("UserRecord", "too many servers"));
        }
        let mut servers = BTreeMap::new();
        for _ in 0..count {
            let server_id = read_string(reader, MAX_ID_LENGTH)?;
            let state = ServerState::read(reader)?;
            if servers.insert(server_id, state).is_some() {
                return Err(Error::Invalid("UserRecord", "duplicate server"));
            }
        }
        Ok(Self {
            nickname,
            registered_at,
            last_seen,
            preferences,
            servers,
        })
    }
}

impl EncodeSize for UserRecord {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.nickname)
            + self.registered_at.encode_size()
            + self.last_seen.encode_size()
            + self.preferences.encode_size()
            + 4
            + self
                .servers
                .iter()
                .map(|(server_id, state)| string_encode_size(server_id) + state.encode_size())
                .sum::<usize>()
    }
}
