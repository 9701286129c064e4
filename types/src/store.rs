use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    read_string, read_string_list, string_encode_size, string_list_encode_size, write_string,
    write_string_list, Clan, Leaderboard, UserRecord, MAX_ID_LENGTH, MAX_ROSTER_USERS,
    MAX_SERVER_CLANS, MAX_TAG_LENGTH,
};

/// Users registered on one server, in first-contact order. Supports
/// per-server enumeration, which the key/value store cannot do by scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    pub users: Vec<String>,
}

impl Roster {
    /// Append a user on first contact. Returns false if already present.
    pub fn add(&mut self, user_id: &str) -> bool {
        if self.users.iter().any(|u| u == user_id) {
            return false;
        }
        self.users.push(user_id.to_string());
        true
    }
}

impl Write for Roster {
    fn write(&self, writer: &mut impl BufMut) {
        write_string_list(&self.users, writer);
    }
}

impl Read for Roster {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            users: read_string_list(reader, MAX_ROSTER_USERS, MAX_ID_LENGTH)?,
        })
    }
}

impl EncodeSize for Roster {
    fn encode_size(&self) -> usize {
        string_list_encode_size(&self.users)
    }
}

/// Tags of live clans on one server, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClanIndex {
    pub tags: Vec<String>,
}

impl ClanIndex {
    pub fn add(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}

impl Write for ClanIndex {
    fn write(&self, writer: &mut impl BufMut) {
        write_string_list(&self.tags, writer);
    }
}

impl Read for ClanIndex {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            tags: read_string_list(reader, MAX_SERVER_CLANS, MAX_TAG_LENGTH)?,
        })
    }
}

impl EncodeSize for ClanIndex {
    fn encode_size(&self) -> usize {
        string_list_encode_size(&self.tags)
    }
}

/// Store key space for all ledger records.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// One user across all servers, keyed by user id.
    User(String),
    /// Users registered on a server, keyed by server id.
    Roster(String),
    /// One clan, keyed by server id and tag.
    Clan { server: String, tag: String },
    /// Live clan tags on a server, keyed by server id.
    ClanIndex(String),
    /// Wealth leaderboard, keyed by server id.
    Leaderboard(String),
    /// Monotonic sequence for clan id generation.
    ClanSeq,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::User(user_id) => {
                0u8.write(writer);
                write_string(user_id, writer);
            }
            Self::Roster(server_id) => {
                1u8.write(writer);
                write_string(server_id, writer);
            }
            Self::Clan { server, tag } => {
                2u8.write(writer);
                write_string(server, writer);
                write_string(tag, writer);
            }
            Self::ClanIndex(server_id) => {
                3u8.write(writer);
                write_string(server_id, writer);
            }
            Self::Leaderboard(server_id) => {
                4u8.write(writer);
                write_string(server_id, writer);
            }
            Self::ClanSeq => 5u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        Ok(match kind {
            0 => Self::User(read_string(reader, MAX_ID_LENGTH)?),
            1 => Self::Roster(read_string(reader, MAX_ID_LENGTH)?),
            2 => Self::Clan {
                server: read_string(reader, MAX_ID_LENGTH)?,
                tag: read_string(reader, MAX_TAG_LENGTH)?,
            },
            3 => Self::ClanIndex(read_string(reader, MAX_ID_LENGTH)?),
            4 => Self::Leaderboard(read_string(reader, MAX_ID_LENGTH)?),
            5 => Self::ClanSeq,
            i => return Err(Error::InvalidEnum(i)),
        })
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::User(id) | Self::Roster(id) | Self::ClanIndex(id) | Self::Leaderboard(id) => {
                string_encode_size(id)
            }
            Self::Clan { server, tag } => string_encode_size(server) + string_encode_size(tag),
            Self::ClanSeq => 0,
        }
    }
}

/// Store value space, one variant per key kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    User(UserRecord),
    Roster(Roster),
    Clan(Clan),
    ClanIndex(ClanIndex),
    Leaderboard(Leaderboard),
    Sequence(u64),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::User(user) => {
                0u8.write(writer);
                user.write(writer);
            }
            Self::Roster(roster) => {
                1u8.write(writer);
                roster.write(writer);
            }
            Self::Clan(clan) => {
                2u8.write(writer);
                clan.write(writer);
            }
            Self::ClanIndex(index) => {
                3u8.write(writer);
                index.write(writer);
            }
            Self::Leaderboard(board) => {
                4u8.write(writer);
                board.write(writer);
            }
            Self::Sequence(next) => {
                5u8.write(writer);
                next.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        Ok(match kind {
            0 => Self::User(UserRecord::read(reader)?),
            1 => Self::Roster(Roster::read(reader)?),
            2 => Self::Clan(Clan::read(reader)?),
            3 => Self::ClanIndex(ClanIndex::read(reader)?),
            4 => Self::Leaderboard(Leaderboard::read(reader)?),
            5 => Self::Sequence(u64::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        })
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::User(user) => user.encode_size(),
            Self::Roster(roster) => roster.encode_size(),
            Self::Clan(clan) => clan.encode_size(),
            Self::ClanIndex(index) => index.encode_size(),
            Self::Leaderboard(board) => board.encode_size(),
            Self::Sequence(next) => next.encode_size(),
        }
    }
}
