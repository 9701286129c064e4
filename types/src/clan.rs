use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    read_string, read_string_list, string_encode_size, string_list_encode_size, write_string,
    write_string_list, MAX_CLAN_MEMBERS, MAX_CLAN_NAME_LENGTH, MAX_DESCRIPTION_LENGTH,
    MAX_ID_LENGTH, MAX_TAG_LENGTH,
};

/// Derived clan statistics, recomputed on every membership or
/// balance-affecting change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClanStats {
    pub total_members: u32,
    pub active_members: u32,
    pub total_wealth: u64,
    pub average_balance: u64,
}

impl Write for ClanStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_members.write(writer);
        self.active_members.write(writer);
        self.total_wealth.write(writer);
        self.average_balance.write(writer);
    }
}

impl Read for ClanStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            total_members: u32::read(reader)?,
            active_members: u32::read(reader)?,
            total_wealth: u64::read(reader)?,
            average_balance: u64::read(reader)?,
        })
    }
}

impl EncodeSize for ClanStats {
    fn encode_size(&self) -> usize {
        self.total_members.encode_size()
            + self.active_members.encode_size()
            + self.total_wealth.encode_size()
            + self.average_balance.encode_size()
    }
}

/// A named, tagged group of users scoped to one server.
///
/// Invariants: `leader` is always present in `members`, `members` holds no
/// duplicates, and a stored clan always has at least one member (an empty
/// clan is dissolved, never written back).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clan {
    pub id: u64,
    pub name: String,
    pub tag: String,
    pub description: String,
    pub leader: String,
    pub members: Vec<String>,
    pub created_at: u64,
    pub stats: ClanStats,
}

impl Clan {
    /// A clan starts with exactly one member, the founder, who leads it.
    pub fn new(
        id: u64,
        name: String,
        tag: String,
        description: String,
        founder: String,
        now: u64,
    ) -> Self {
        Self {
            id,
            name,
            tag,
            description,
            leader: founder.clone(),
            members: vec![founder],
            created_at: now,
            stats: ClanStats::default(),
        }
    }
}

impl Write for Clan {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_string(&self.name, writer);
        write_string(&self.tag, writer);
        write_string(&self.description, writer);
        write_string(&self.leader, writer);
        write_string_list(&self.members, writer);
        self.created_at.write(writer);
        self.stats.write(writer);
    }
}

impl Read for Clan {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            name: read_string(reader, MAX_CLAN_NAME_LENGTH)?,
            tag: read_string(reader, MAX_TAG_LENGTH)?,
            description: read_string(reader, MAX_DESCRIPTION_LENGTH)?,
            leader: read_string(reader, MAX_ID_LENGTH)?,
            members: read_string_list(reader, MAX_CLAN_MEMBERS, MAX_ID_LENGTH)?,
            created_at: u64::read(reader)?,
            stats: ClanStats::read(reader)?,
        })
    }
}

impl EncodeSize for Clan {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + string_encode_size(&self.name)
            + string_encode_size(&self.tag)
            + string_encode_size(&self.description)
            + string_encode_size(&self.leader)
            + string_list_encode_size(&self.members)
            + self.created_at.encode_size()
            + self.stats.encode_size()
    }
}

/// One clan's position in the per-server standings. Derived on demand,
/// never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClanStanding {
    pub id: u64,
    pub name: String,
    pub tag: String,
    pub stats: ClanStats,
}

impl From<&Clan> for ClanStanding {
    fn from(clan: &Clan) -> Self {
        Self {
            id: clan.id,
            name: clan.name.clone(),
            tag: clan.tag.clone(),
            stats: clan.stats,
        }
    }
}
