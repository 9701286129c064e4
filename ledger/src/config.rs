use garrison_types::{
    LEADERBOARD_SIZE, MAX_CLAN_NAME_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_ID_LENGTH,
    MAX_NICKNAME_LENGTH, MAX_TAG_LENGTH,
};
use serde::{Deserialize, Serialize};

/// Policy knobs for ledger operations. The embedding layer deserializes
/// these from its own configuration; defaults match the stored-record caps.
/// Limits may only tighten those caps: raising one past its stored-record
/// bound would write records the codec refuses to read back.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    pub max_id_length: usize,
    pub max_nickname_length: usize,
    pub max_tag_length: usize,
    pub max_clan_name_length: usize,
    pub max_description_length: usize,
    /// Balance granted when a server state is first created.
    pub starting_balance: u64,
    /// Largest single wager `record_game` accepts.
    pub max_bet: u64,
    /// Entries kept on each server leaderboard.
    pub leaderboard_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_id_length: MAX_ID_LENGTH,
            max_nickname_length: MAX_NICKNAME_LENGTH,
            max_tag_length: MAX_TAG_LENGTH,
            max_clan_name_length: MAX_CLAN_NAME_LENGTH,
            max_description_length: MAX_DESCRIPTION_LENGTH,
            starting_balance: 0,
            max_bet: 1_000_000,
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}
