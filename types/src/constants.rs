/// Maximum length for user and server identifiers
pub const MAX_ID_LENGTH: usize = 64;

/// Maximum nickname length for user profiles
pub const MAX_NICKNAME_LENGTH: usize = 32;

/// Maximum clan tag length
pub const MAX_TAG_LENGTH: usize = 8;

/// Maximum clan name length
pub const MAX_CLAN_NAME_LENGTH: usize = 48;

/// Maximum clan description length
pub const MAX_DESCRIPTION_LENGTH: usize = 256;

/// Maximum number of servers one user record can span
pub const MAX_SERVERS_PER_USER: usize = 256;

/// Maximum number of members in one clan
pub const MAX_CLAN_MEMBERS: usize = 1_000;

/// Maximum number of users tracked on one server roster
pub const MAX_ROSTER_USERS: usize = 100_000;

/// Maximum number of clans on one server
pub const MAX_SERVER_CLANS: usize = 10_000;

/// Default number of entries kept on a server leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Hard cap on stored leaderboard entries regardless of policy
pub const MAX_LEADERBOARD_ENTRIES: usize = 100;
