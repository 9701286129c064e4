use futures::lock::Mutex;
use tracing::{debug, warn};

use garrison_types::{
    Clan, ClanIndex, ClanStanding, ClanStats, GameType, Key, Leaderboard, Preferences, Roster,
    ServerState, UserRecord, Value, MAX_CLAN_MEMBERS, MAX_LEADERBOARD_ENTRIES,
    MAX_ROSTER_USERS, MAX_SERVERS_PER_USER, MAX_SERVER_CLANS,
};

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::state::{Overlay, State};

/// The ledger facade: every user, balance, clan, and wager operation goes
/// through here.
///
/// The store sits behind one async mutex. Each operation locks, stages its
/// whole effect in an [`Overlay`], and applies the change list in one step,
/// so concurrent callers serialize and a failed operation leaves the store
/// untouched. Nothing network-bound ever runs under the lock.
pub struct Ledger<S: State> {
    state: Mutex<S>,
    limits: Limits,
}

impl<S: State> Ledger<S> {
    pub fn new(state: S, limits: Limits) -> Self {
        Self {
            state: Mutex::new(state),
            limits,
        }
    }

    /// Hand the store back, e.g. to sync a durable backend at shutdown.
    pub fn into_state(self) -> S {
        self.state.into_inner()
    }

    /// Idempotently register a user on a server.
    ///
    /// Creates the user record (nickname defaults to the user id) and the
    /// per-server state (starting balance, no clan, active, zeroed stats) as
    /// needed, and refreshes `last_seen`. Returns whether anything was
    /// created.
    pub async fn ensure_user_on_server(
        &self,
        user_id: &str,
        server_id: &str,
        now: u64,
    ) -> Result<bool> {
        require_id("user id", user_id, self.limits.max_id_length)?;
        require_id("server id", server_id, self.limits.max_id_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut created = false;
        let mut user = match load_user(&overlay, user_id).await {
            Some(user) => user,
            None => {
                created = true;
                // Default nickname is the user id, clipped to the nickname cap.
                let nickname = clip(user_id, self.limits.max_nickname_length);
                UserRecord::new(nickname, now)
            }
        };
        user.last_seen = now;

        if !user.servers.contains_key(server_id) {
            created = true;
            if user.servers.len() >= MAX_SERVERS_PER_USER {
                return Err(Error::FieldTooLong {
                    field: "server list",
                    len: user.servers.len(),
                    max: MAX_SERVERS_PER_USER,
                });
            }
            user.servers.insert(
                server_id.to_string(),
                ServerState::new(now, self.limits.starting_balance),
            );

            let mut roster = load_roster(&overlay, server_id).await;
            if roster.users.len() >= MAX_ROSTER_USERS {
                return Err(Error::FieldTooLong {
                    field: "server roster",
                    len: roster.users.len(),
                    max: MAX_ROSTER_USERS,
                });
            }
            if roster.add(user_id) {
                overlay
                    .insert(Key::Roster(server_id.to_string()), Value::Roster(roster))
                    .await;
            }

            if self.limits.starting_balance > 0 {
                refresh_leaderboard(
                    &mut overlay,
                    server_id,
                    user_id,
                    &user,
                    self.limits.leaderboard_size,
                )
                .await;
            }
        }

        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user))
            .await;
        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(created)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserRecord> {
        let state = self.state.lock().await;
        load_user(&*state, user_id)
            .await
            .ok_or_else(|| Error::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// All users registered on a server, in first-contact order.
    pub async fn get_users_on_server(&self, server_id: &str) -> Result<Vec<(String, UserRecord)>> {
        let state = self.state.lock().await;
        let roster = load_roster(&*state, server_id).await;
        let mut users = Vec::with_capacity(roster.users.len());
        for user_id in roster.users {
            let Some(user) = load_user(&*state, &user_id).await else {
                warn!(user = %user_id, "roster references missing user record");
                continue;
            };
            if user.servers.contains_key(server_id) {
                users.push((user_id, user));
            }
        }
        Ok(users)
    }

    /// Change a user's display name, refreshing their leaderboard entries.
    pub async fn set_nickname(&self, user_id: &str, nickname: &str, now: u64) -> Result<()> {
        require_id("nickname", nickname, self.limits.max_nickname_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| Error::UserNotFound {
                user_id: user_id.to_string(),
            })?;
        user.nickname = nickname.to_string();
        user.last_seen = now;
        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user.clone()))
            .await;

        let server_ids: Vec<String> = user.servers.keys().cloned().collect();
        for server_id in &server_ids {
            refresh_leaderboard(
                &mut overlay,
                server_id,
                user_id,
                &user,
                self.limits.leaderboard_size,
            )
            .await;
        }

        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(())
    }

    /// Replace a user's preferences. Opting out of leaderboards removes
    /// their entries everywhere in the same commit.
    pub async fn set_preferences(
        &self,
        user_id: &str,
        preferences: Preferences,
        now: u64,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| Error::UserNotFound {
                user_id: user_id.to_string(),
            })?;
        user.preferences = preferences;
        user.last_seen = now;
        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user.clone()))
            .await;

        let server_ids: Vec<String> = user.servers.keys().cloned().collect();
        for server_id in &server_ids {
            refresh_leaderboard(
                &mut overlay,
                server_id,
                user_id,
                &user,
                self.limits.leaderboard_size,
            )
            .await;
        }

        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(())
    }

    /// Apply a signed delta to a user's balance on one server.
    ///
    /// Fails with `InsufficientFunds` if the delta would drive the balance
    /// below zero, leaving everything unchanged. On success the user's clan
    /// stats and the server leaderboard move in the same commit.
    pub async fn adjust_balance(
        &self,
        user_id: &str,
        server_id: &str,
        delta: i64,
        now: u64,
    ) -> Result<u64> {
        require_id("user id", user_id, self.limits.max_id_length)?;
        require_id("server id", server_id, self.limits.max_id_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| not_on_server(user_id, server_id))?;
        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(user_id, server_id));
        };
        let new_balance = apply_delta(server_state.balance, delta)?;
        server_state.balance = new_balance;
        user.last_seen = now;

        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user.clone()))
            .await;
        refresh_leaderboard(
            &mut overlay,
            server_id,
            user_id,
            &user,
            self.limits.leaderboard_size,
        )
        .await;
        sync_clan_after_balance_change(&mut overlay, server_id, user_id).await?;

        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(new_balance)
    }

    /// Mark a user active or inactive on one server. Inactive members keep
    /// their balance but drop out of clan wealth and averages.
    pub async fn set_active(
        &self,
        user_id: &str,
        server_id: &str,
        active: bool,
        now: u64,
    ) -> Result<()> {
        require_id("user id", user_id, self.limits.max_id_length)?;
        require_id("server id", server_id, self.limits.max_id_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| not_on_server(user_id, server_id))?;
        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(user_id, server_id));
        };
        server_state.is_active = active;
        user.last_seen = now;

        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user))
            .await;
        sync_clan_after_balance_change(&mut overlay, server_id, user_id).await?;

        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(())
    }

    /// A user's balance on one server, zero if they hold no state there.
    pub async fn get_balance(&self, user_id: &str, server_id: &str) -> u64 {
        let state = self.state.lock().await;
        match load_user(&*state, user_id).await {
            Some(user) => user.servers.get(server_id).map_or(0, |s| s.balance),
            None => 0,
        }
    }

    /// The server's wealth leaderboard.
    pub async fn leaderboard(&self, server_id: &str) -> Leaderboard {
        let state = self.state.lock().await;
        load_leaderboard(&*state, server_id).await
    }

    /// Found a clan with a unique tag on a server. The founder becomes the
    /// sole member and leader.
    pub async fn create_clan(
        &self,
        server_id: &str,
        founder_id: &str,
        name: &str,
        tag: &str,
        description: &str,
        now: u64,
    ) -> Result<Clan> {
        require_id("server id", server_id, self.limits.max_id_length)?;
        require_id("user id", founder_id, self.limits.max_id_length)?;
        require_id("clan name", name, self.limits.max_clan_name_length)?;
        require_id("clan tag", tag, self.limits.max_tag_length)?;
        if description.len() > self.limits.max_description_length {
            return Err(Error::FieldTooLong {
                field: "clan description",
                len: description.len(),
                max: self.limits.max_description_length,
            });
        }

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, founder_id)
            .await
            .ok_or_else(|| not_on_server(founder_id, server_id))?;
        if !user.servers.contains_key(server_id) {
            return Err(not_on_server(founder_id, server_id));
        }
        if live_clan_tag(&overlay, server_id, &mut user).await?.is_some() {
            return Err(Error::UserAlreadyInClan {
                user_id: founder_id.to_string(),
                server_id: server_id.to_string(),
            });
        }
        if load_clan(&overlay, server_id, tag).await?.is_some() {
            return Err(Error::ClanTagTaken {
                server_id: server_id.to_string(),
                tag: tag.to_string(),
            });
        }

        let id = next_clan_id(&mut overlay).await;
        let mut clan = Clan::new(
            id,
            name.to_string(),
            tag.to_string(),
            description.to_string(),
            founder_id.to_string(),
            now,
        );

        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(founder_id, server_id));
        };
        server_state.clan_tag = Some(tag.to_string());
        user.last_seen = now;
        overlay
            .insert(Key::User(founder_id.to_string()), Value::User(user))
            .await;

        recompute_stats(&overlay, server_id, &mut clan).await;
        overlay
            .insert(
                Key::Clan {
                    server: server_id.to_string(),
                    tag: tag.to_string(),
                },
                Value::Clan(clan.clone()),
            )
            .await;

        let mut index = load_clan_index(&overlay, server_id).await;
        if index.tags.len() >= MAX_SERVER_CLANS {
            return Err(Error::FieldTooLong {
                field: "clan index",
                len: index.tags.len(),
                max: MAX_SERVER_CLANS,
            });
        }
        if index.add(tag) {
            overlay
                .insert(Key::ClanIndex(server_id.to_string()), Value::ClanIndex(index))
                .await;
        }

        let changes = overlay.commit();
        state.apply(changes).await;
        debug!(server = %server_id, tag = %tag, id, "clan created");
        Ok(clan)
    }

    /// Join an existing clan by tag.
    pub async fn join_clan(
        &self,
        server_id: &str,
        user_id: &str,
        tag: &str,
        now: u64,
    ) -> Result<Clan> {
        require_id("server id", server_id, self.limits.max_id_length)?;
        require_id("user id", user_id, self.limits.max_id_length)?;
        require_id("clan tag", tag, self.limits.max_tag_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| not_on_server(user_id, server_id))?;
        if !user.servers.contains_key(server_id) {
            return Err(not_on_server(user_id, server_id));
        }
        if live_clan_tag(&overlay, server_id, &mut user).await?.is_some() {
            return Err(Error::UserAlreadyInClan {
                user_id: user_id.to_string(),
                server_id: server_id.to_string(),
            });
        }

        let mut clan = load_clan(&overlay, server_id, tag)
            .await?
            .ok_or_else(|| Error::ClanNotFound {
                server_id: server_id.to_string(),
                tag: tag.to_string(),
            })?;
        if clan.members.iter().any(|m| m == user_id) {
            return Err(Error::UserAlreadyInClan {
                user_id: user_id.to_string(),
                server_id: server_id.to_string(),
            });
        }
        if clan.members.len() >= MAX_CLAN_MEMBERS {
            return Err(Error::ClanFull {
                tag: tag.to_string(),
                max: MAX_CLAN_MEMBERS,
            });
        }
        clan.members.push(user_id.to_string());

        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(user_id, server_id));
        };
        server_state.clan_tag = Some(tag.to_string());
        user.last_seen = now;
        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user))
            .await;

        recompute_stats(&overlay, server_id, &mut clan).await;
        overlay
            .insert(
                Key::Clan {
                    server: server_id.to_string(),
                    tag: tag.to_string(),
                },
                Value::Clan(clan.clone()),
            )
            .await;

        let changes = overlay.commit();
        state.apply(changes).await;
        debug!(server = %server_id, tag = %tag, user = %user_id, "user joined clan");
        Ok(clan)
    }

    /// Leave the clan the user currently belongs to on a server.
    ///
    /// The last member out dissolves the clan; a departing leader hands the
    /// position to the first remaining member in list order.
    pub async fn leave_clan(&self, server_id: &str, user_id: &str, now: u64) -> Result<()> {
        require_id("server id", server_id, self.limits.max_id_length)?;
        require_id("user id", user_id, self.limits.max_id_length)?;

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| not_on_server(user_id, server_id))?;
        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(user_id, server_id));
        };
        let Some(tag) = server_state.clan_tag.take() else {
            return Err(Error::UserNotInClan {
                user_id: user_id.to_string(),
                server_id: server_id.to_string(),
            });
        };
        user.last_seen = now;
        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user))
            .await;

        match load_clan(&overlay, server_id, &tag).await? {
            None => {
                // The tag pointed at a dissolved clan; the user is already
                // out, so clearing the tag is the whole operation.
                debug!(server = %server_id, tag = %tag, user = %user_id, "cleared dangling clan tag");
            }
            Some(mut clan) => {
                let before = clan.members.len();
                clan.members.retain(|m| m != user_id);
                if clan.members.len() == before {
                    debug!(server = %server_id, tag = %tag, user = %user_id, "clan tag did not match member list");
                } else if clan.members.is_empty() {
                    overlay
                        .delete(&Key::Clan {
                            server: server_id.to_string(),
                            tag: tag.clone(),
                        })
                        .await;
                    let mut index = load_clan_index(&overlay, server_id).await;
                    index.remove(&tag);
                    overlay
                        .insert(Key::ClanIndex(server_id.to_string()), Value::ClanIndex(index))
                        .await;
                    debug!(server = %server_id, tag = %tag, "clan dissolved");
                } else {
                    if clan.leader == user_id {
                        clan.leader = clan.members[0].clone();
                        debug!(server = %server_id, tag = %tag, leader = %clan.leader, "clan leadership transferred");
                    }
                    recompute_stats(&overlay, server_id, &mut clan).await;
                    overlay
                        .insert(
                            Key::Clan {
                                server: server_id.to_string(),
                                tag: tag.clone(),
                            },
                            Value::Clan(clan),
                        )
                        .await;
                }
            }
        }

        let changes = overlay.commit();
        state.apply(changes).await;
        Ok(())
    }

    pub async fn get_clan(&self, server_id: &str, tag: &str) -> Result<Clan> {
        let state = self.state.lock().await;
        load_clan(&*state, server_id, tag)
            .await?
            .ok_or_else(|| Error::ClanNotFound {
                server_id: server_id.to_string(),
                tag: tag.to_string(),
            })
    }

    /// All live clans on a server, ordered by clan id.
    pub async fn list_clans_for_server(&self, server_id: &str) -> Result<Vec<Clan>> {
        let state = self.state.lock().await;
        clans_on_server(&*state, server_id).await
    }

    /// Per-clan standings ranked by total wealth, ties broken by clan id.
    pub async fn clan_stats_for_server(&self, server_id: &str) -> Result<Vec<ClanStanding>> {
        let state = self.state.lock().await;
        let clans = clans_on_server(&*state, server_id).await?;
        let mut standings: Vec<ClanStanding> = clans.iter().map(ClanStanding::from).collect();
        standings.sort_by(|a, b| {
            b.stats
                .total_wealth
                .cmp(&a.stats.total_wealth)
                .then(a.id.cmp(&b.id))
        });
        Ok(standings)
    }

    /// Settle one wager: apply `winnings - bet` as a single balance change
    /// and fold the wager into the user's gambling stats.
    ///
    /// The bet must have been affordable on its own; a shortfall fails with
    /// `InsufficientFunds` even if the winnings would cover it.
    pub async fn record_game(
        &self,
        user_id: &str,
        server_id: &str,
        game_type: GameType,
        bet: u64,
        winnings: u64,
        now: u64,
    ) -> Result<u64> {
        require_id("user id", user_id, self.limits.max_id_length)?;
        require_id("server id", server_id, self.limits.max_id_length)?;
        if bet == 0 {
            return Err(Error::InvalidBet { bet });
        }
        if bet > self.limits.max_bet {
            return Err(Error::BetTooLarge {
                bet,
                max: self.limits.max_bet,
            });
        }

        let mut state = self.state.lock().await;
        let mut overlay = Overlay::new(&*state);

        let mut user = load_user(&overlay, user_id)
            .await
            .ok_or_else(|| not_on_server(user_id, server_id))?;
        let Some(server_state) = user.servers.get_mut(server_id) else {
            return Err(not_on_server(user_id, server_id));
        };
        if server_state.balance < bet {
            return Err(Error::InsufficientFunds {
                balance: server_state.balance,
                needed: bet,
            });
        }
        let new_balance = (server_state.balance - bet)
            .checked_add(winnings)
            .ok_or(Error::Corrupted {
                detail: "balance overflow",
            })?;
        server_state.balance = new_balance;
        server_state.stats.record(bet, winnings, now);
        user.last_seen = now;

        overlay
            .insert(Key::User(user_id.to_string()), Value::User(user.clone()))
            .await;
        refresh_leaderboard(
            &mut overlay,
            server_id,
            user_id,
            &user,
            self.limits.leaderboard_size,
        )
        .await;
        sync_clan_after_balance_change(&mut overlay, server_id, user_id).await?;

        let changes = overlay.commit();
        state.apply(changes).await;
        debug!(user = %user_id, server = %server_id, game = ?game_type, bet, winnings, "wager recorded");
        Ok(new_balance)
    }
}

fn require_id(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::EmptyIdentifier { field });
    }
    if value.len() > max {
        return Err(Error::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Clip a string to at most `max` bytes without splitting a character.
fn clip(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut cut = max;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    value[..cut].to_string()
}

fn not_on_server(user_id: &str, server_id: &str) -> Error {
    Error::UserNotOnServer {
        user_id: user_id.to_string(),
        server_id: server_id.to_string(),
    }
}

fn apply_delta(balance: u64, delta: i64) -> Result<u64> {
    let next = balance as i128 + delta as i128;
    if next < 0 {
        return Err(Error::InsufficientFunds {
            balance,
            needed: delta.unsigned_abs(),
        });
    }
    u64::try_from(next).map_err(|_| Error::Corrupted {
        detail: "balance overflow",
    })
}

fn display_name(user: &UserRecord, user_id: &str) -> String {
    if user.preferences.display_nickname {
        user.nickname.clone()
    } else {
        user_id.to_string()
    }
}

async fn load_user<S: State>(state: &S, user_id: &str) -> Option<UserRecord> {
    match state.get(&Key::User(user_id.to_string())).await {
        Some(Value::User(user)) => Some(user),
        _ => None,
    }
}

/// Load a clan, refusing corrupted records: a stored clan must have at least
/// one member and its leader must be one of them.
async fn load_clan<S: State>(state: &S, server_id: &str, tag: &str) -> Result<Option<Clan>> {
    let key = Key::Clan {
        server: server_id.to_string(),
        tag: tag.to_string(),
    };
    match state.get(&key).await {
        Some(Value::Clan(clan)) => {
            if clan.members.is_empty() {
                return Err(Error::Corrupted {
                    detail: "stored clan has no members",
                });
            }
            if !clan.members.iter().any(|m| *m == clan.leader) {
                return Err(Error::Corrupted {
                    detail: "clan leader is not a member",
                });
            }
            Ok(Some(clan))
        }
        _ => Ok(None),
    }
}

async fn load_roster<S: State>(state: &S, server_id: &str) -> Roster {
    match state.get(&Key::Roster(server_id.to_string())).await {
        Some(Value::Roster(roster)) => roster,
        _ => Roster::default(),
    }
}

async fn load_clan_index<S: State>(state: &S, server_id: &str) -> ClanIndex {
    match state.get(&Key::ClanIndex(server_id.to_string())).await {
        Some(Value::ClanIndex(index)) => index,
        _ => ClanIndex::default(),
    }
}

async fn load_leaderboard<S: State>(state: &S, server_id: &str) -> Leaderboard {
    match state.get(&Key::Leaderboard(server_id.to_string())).await {
        Some(Value::Leaderboard(board)) => board,
        _ => Leaderboard::default(),
    }
}

async fn next_clan_id<S: State>(overlay: &mut Overlay<'_, S>) -> u64 {
    let next = match overlay.get(&Key::ClanSeq).await {
        Some(Value::Sequence(next)) => next,
        _ => 1,
    };
    overlay
        .insert(Key::ClanSeq, Value::Sequence(next + 1))
        .await;
    next
}

/// The user's live clan tag on a server. A tag pointing at a clan that no
/// longer exists is cleared in place instead of surfacing an error.
async fn live_clan_tag<S: State>(
    state: &S,
    server_id: &str,
    user: &mut UserRecord,
) -> Result<Option<String>> {
    let Some(server_state) = user.servers.get_mut(server_id) else {
        return Ok(None);
    };
    let Some(tag) = server_state.clan_tag.clone() else {
        return Ok(None);
    };
    match load_clan(state, server_id, &tag).await? {
        Some(_) => Ok(Some(tag)),
        None => {
            debug!(server = %server_id, tag = %tag, "cleared dangling clan tag");
            server_state.clan_tag = None;
            Ok(None)
        }
    }
}

/// Recompute a clan's derived stats by walking the current member list and
/// reading every member's server state through the live view.
async fn recompute_stats<S: State>(state: &S, server_id: &str, clan: &mut Clan) {
    let mut total_wealth: u64 = 0;
    let mut active_members: u32 = 0;
    for member in &clan.members {
        let Some(user) = load_user(state, member).await else {
            warn!(member = %member, "clan member has no user record");
            continue;
        };
        let Some(server_state) = user.servers.get(server_id) else {
            continue;
        };
        if !server_state.is_active {
            continue;
        }
        active_members += 1;
        total_wealth = total_wealth.saturating_add(server_state.balance);
    }
    clan.stats = ClanStats {
        total_members: clan.members.len() as u32,
        active_members,
        total_wealth,
        average_balance: if active_members == 0 {
            0
        } else {
            total_wealth / active_members as u64
        },
    };
}

/// Bring the server leaderboard in line with a user's current balance and
/// preferences.
async fn refresh_leaderboard<S: State>(
    overlay: &mut Overlay<'_, S>,
    server_id: &str,
    user_id: &str,
    user: &UserRecord,
    capacity: usize,
) {
    let mut board = load_leaderboard(&*overlay, server_id).await;
    if user.preferences.show_in_leaderboards {
        let Some(server_state) = user.servers.get(server_id) else {
            return;
        };
        board.update(
            user_id,
            display_name(user, user_id),
            server_state.balance,
            capacity.min(MAX_LEADERBOARD_ENTRIES),
        );
    } else {
        board.remove(user_id);
    }
    overlay
        .insert(
            Key::Leaderboard(server_id.to_string()),
            Value::Leaderboard(board),
        )
        .await;
}

/// After a balance change, recompute the stats of the clan the user belongs
/// to, clearing a dangling tag if the clan is gone.
async fn sync_clan_after_balance_change<S: State>(
    overlay: &mut Overlay<'_, S>,
    server_id: &str,
    user_id: &str,
) -> Result<()> {
    let Some(mut user) = load_user(&*overlay, user_id).await else {
        return Ok(());
    };
    let Some(server_state) = user.servers.get(server_id) else {
        return Ok(());
    };
    let Some(tag) = server_state.clan_tag.clone() else {
        return Ok(());
    };
    match load_clan(&*overlay, server_id, &tag).await? {
        Some(mut clan) => {
            recompute_stats(&*overlay, server_id, &mut clan).await;
            overlay
                .insert(
                    Key::Clan {
                        server: server_id.to_string(),
                        tag,
                    },
                    Value::Clan(clan),
                )
                .await;
        }
        None => {
            debug!(server = %server_id, tag = %tag, user = %user_id, "cleared dangling clan tag");
            if let Some(server_state) = user.servers.get_mut(server_id) {
                server_state.clan_tag = None;
            }
            overlay
                .insert(Key::User(user_id.to_string()), Value::User(user))
                .await;
        }
    }
    Ok(())
}

async fn clans_on_server<S: State>(state: &S, server_id: &str) -> Result<Vec<Clan>> {
    let index = load_clan_index(state, server_id).await;
    let mut clans = Vec::with_capacity(index.tags.len());
    for tag in &index.tags {
        match load_clan(state, server_id, tag).await? {
            Some(clan) => clans.push(clan),
            None => warn!(server = %server_id, tag = %tag, "clan index references missing clan"),
        }
    }
    clans.sort_by_key(|c| c.id);
    Ok(clans)
}
