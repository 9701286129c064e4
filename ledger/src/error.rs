use thiserror::Error;

/// Error type for ledger operations. Every failure here is recoverable and
/// caller-visible; only `Corrupted` marks a record the core refuses to touch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },
    #[error("user {user_id} is not registered on server {server_id}")]
    UserNotOnServer { user_id: String, server_id: String },
    #[error("no clan with tag {tag} on server {server_id}")]
    ClanNotFound { server_id: String, tag: String },
    #[error("clan tag {tag} is already taken on server {server_id}")]
    ClanTagTaken { server_id: String, tag: String },
    #[error("clan {tag} is full ({max} members)")]
    ClanFull { tag: String, max: usize },
    #[error("user {user_id} already belongs to a clan on server {server_id}")]
    UserAlreadyInClan { user_id: String, server_id: String },
    #[error("user {user_id} does not belong to a clan on server {server_id}")]
    UserNotInClan { user_id: String, server_id: String },
    #[error("{field} must not be empty")]
    EmptyIdentifier { field: &'static str },
    #[error("{field} too long: {len} characters (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("invalid bet: {bet}")]
    InvalidBet { bet: u64 },
    #[error("bet too large: {bet} (max {max})")]
    BetTooLarge { bet: u64, max: u64 },
    #[error("invalid prediction: {got} (expected {expected})")]
    InvalidPrediction { got: u8, expected: &'static str },
    #[error("insufficient funds: balance {balance}, needed {needed}")]
    InsufficientFunds { balance: u64, needed: u64 },
    #[error("stored record is corrupted: {detail}")]
    Corrupted { detail: &'static str },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;
