mod clan;
mod codec;
mod constants;
mod game;
mod leaderboard;
mod store;
mod user;

pub use clan::*;
pub use codec::{
    read_string, read_string_list, string_encode_size, string_list_encode_size, write_string,
    write_string_list,
};
pub use constants::*;
pub use game::*;
pub use leaderboard::*;
pub use store::*;
pub use user::*;

#[cfg(test)]
mod tests;
