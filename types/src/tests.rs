use super::*;
use commonware_codec::{Encode, ReadExt, Write};

#[test]
fn test_game_type_roundtrip() {
    for game_type in [GameType::Slots, GameType::Coinflip, GameType::Dice] {
        let encoded = game_type.encode();
        let decoded = GameType::read(&mut &encoded[..]).unwrap();
        assert_eq!(game_type, decoded);
    }
}

#[test]
fn test_user_record_roundtrip() {
    let mut user = UserRecord::new("Shadow".to_string(), 1_000);
    let mut state = ServerState::new(1_000, 250);
    state.clan_tag = Some("WOLF".to_string());
    state.stats.record(100, 500, 2_000);
    user.servers.insert("eu-1".to_string(), state);
    user.servers.insert("us-2".to_string(), ServerState::new(1_500, 0));
    user.preferences.display_nickname = false;

    let encoded = user.encode();
    let decoded = UserRecord::read(&mut &encoded[..]).unwrap();
    assert_eq!(user, decoded);
}

#[test]
fn test_clan_roundtrip() {
    let mut clan = Clan::new(
        7,
        "Night Watch".to_string(),
        "NW".to_string(),
        "Guards the wall".to_string(),
        "u1".to_string(),
        3_000,
    );
    clan.members.push("u2".to_string());
    clan.stats = ClanStats {
        total_members: 2,
        active_members: 2,
        total_wealth: 100,
        average_balance: 50,
    };

    let encoded = clan.encode();
    let decoded = Clan::read(&mut &encoded[..]).unwrap();
    assert_eq!(clan, decoded);
}

#[test]
fn test_key_value_roundtrip() {
    let keys = [
        Key::User("u1".to_string()),
        Key::Roster("s1".to_string()),
        Key::Clan {
            server: "s1".to_string(),
            tag: "NW".to_string(),
        },
        Key::ClanIndex("s1".to_string()),
        Key::Leaderboard("s1".to_string()),
        Key::ClanSeq,
    ];
    for key in keys {
        let encoded = key.encode();
        let decoded = Key::read(&mut &encoded[..]).unwrap();
        assert_eq!(key, decoded);
    }

    let value = Value::Sequence(42);
    let encoded = value.encode();
    assert_eq!(Value::read(&mut &encoded[..]).unwrap(), value);
}

#[test]
fn test_user_record_rejects_duplicate_servers() {
    // Hand-encode a record that lists the same server twice.
    let mut encoded = Vec::new();
    write_string("dup", &mut encoded);
    0u64.write(&mut encoded);
    0u64.write(&mut encoded);
    Preferences::default().write(&mut encoded);
    2u32.write(&mut encoded);
    write_string("s1", &mut encoded);
    ServerState::new(0, 0).write(&mut encoded);
    write_string("s1", &mut encoded);
    ServerState::new(0, 0).write(&mut encoded);

    assert!(UserRecord::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_leaderboard_update() {
    let mut board = Leaderboard::default();

    for i in 0..15u64 {
        board.update(&format!("u{i}"), format!("Player{i}"), (i + 1) * 1_000, 10);
    }

    // Should only keep top 10
    assert_eq!(board.entries.len(), 10);

    // Should be sorted by balance descending
    for i in 0..9 {
        assert!(board.entries[i].balance >= board.entries[i + 1].balance);
    }

    // Ranks should be 1-10
    for (i, entry) in board.entries.iter().enumerate() {
        assert_eq!(entry.rank, (i + 1) as u32);
    }
}

#[test]
fn test_leaderboard_ties_keep_first_entry_ahead() {
    let mut board = Leaderboard::default();
    board.update("first", "first".to_string(), 500, 10);
    board.update("second", "second".to_string(), 500, 10);

    assert_eq!(board.entries[0].user_id, "first");
    assert_eq!(board.entries[1].user_id, "second");
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[1].rank, 2);
}

#[test]
fn test_leaderboard_remove_reranks() {
    let mut board = Leaderboard::default();
    board.update("a", "a".to_string(), 300, 10);
    board.update("b", "b".to_string(), 200, 10);
    board.update("c", "c".to_string(), 100, 10);

    board.remove("b");

    assert_eq!(board.entries.len(), 2);
    assert_eq!(board.entries[0].user_id, "a");
    assert_eq!(board.entries[1].user_id, "c");
    assert_eq!(board.entries[1].rank, 2);
}

#[test]
fn test_roster_add_is_idempotent() {
    let mut roster = Roster::default();
    assert!(roster.add("u1"));
    assert!(!roster.add("u1"));
    assert_eq!(roster.users.len(), 1);
}

#[test]
fn test_clan_index_add_remove() {
    let mut index = ClanIndex::default();
    assert!(index.add("NW"));
    assert!(!index.add("NW"));
    index.add("WOLF");
    index.remove("NW");
    assert_eq!(index.tags, vec!["WOLF".to_string()]);
}
