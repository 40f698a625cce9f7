// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::console;
use galena_protocol::protocol::mojang::{self, LoginResult, SessionToken};
use log::{debug, warn};
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

pub const CL_USERNAME: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "cl_username",
    description: r#"cl_username is the username that the client will use to connect
to servers."#,
    mutable: false,
    serializable: true,
    default: &String::new,
};

pub const AUTH_TOKEN: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "auth_token",
    description: r#"auth_token is the token used for this session to auth to servers
or relogin to this account."#,
    mutable: false,
    serializable: false,
    default: &String::new,
};

pub const AUTH_REFRESH_TOKEN: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "auth_refresh_token",
    description: r#"auth_refresh_token is used to renew an expired Microsoft session
without asking for credentials again."#,
    mutable: false,
    serializable: true,
    default: &String::new,
};

pub const AUTH_CLIENT_TOKEN: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "auth_client_token",
    description: r#"auth_client_token is a token that stays static between sessions.
Used to identify this client vs others."#,
    mutable: false,
    serializable: true,
    default: &String::new,
};

pub const AUTH_ACCOUNT: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "auth_account",
    description: r#"auth_account is the account name (email or gamertag) used to log
in. Session cache entries are keyed by it."#,
    mutable: false,
    serializable: true,
    default: &String::new,
};

pub fn register_vars(console: &mut console::Console) {
    console.register(CL_USERNAME);
    console.register(AUTH_TOKEN);
    console.register(AUTH_REFRESH_TOKEN);
    console.register(AUTH_CLIENT_TOKEN);
    console.register(AUTH_ACCOUNT);
}

/// Disk-persisted map of account name -> session token, so restarts don't
/// need a full re-login.
pub struct SessionCache {
    path: String,
    entries: HashMap<String, SessionToken>,
}

impl SessionCache {
    pub fn load(path: &str) -> SessionCache {
        let mut cache = SessionCache {
            path: path.to_owned(),
            entries: HashMap::new(),
        };
        if let Ok(data) = fs::read_to_string(path) {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&data) {
                for (account, entry) in map {
                    if let Some(token) = Self::entry_to_token(&entry) {
                        cache.entries.insert(account, token);
                    }
                }
            }
        }
        cache
    }

    fn entry_to_token(entry: &Value) -> Option<SessionToken> {
        Some(SessionToken {
            access_token: entry.get("accessToken")?.as_str()?.to_owned(),
            refresh_token: entry
                .get("refreshToken")
                .and_then(Value::as_str)
                .map(|v| v.to_owned()),
            player_id: entry.get("playerId")?.as_str()?.to_owned(),
            player_name: entry.get("playerName")?.as_str()?.to_owned(),
            client_id: entry
                .get("clientId")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_owned(),
        })
    }

    pub fn get(&self, account: &str) -> Option<&SessionToken> {
        self.entries.get(&account.to_lowercase())
    }

    pub fn store(&mut self, account: &str, token: SessionToken) {
        self.entries.insert(account.to_lowercase(), token);
        self.save();
    }

    pub fn remove(&mut self, account: &str) {
        self.entries.remove(&account.to_lowercase());
        self.save();
    }

    fn save(&self) {
        let mut map = serde_json::Map::new();
        for (account, token) in &self.entries {
            map.insert(
                account.clone(),
                json!({
                    "accessToken": token.access_token,
                    "refreshToken": token.refresh_token,
                    "playerId": token.player_id,
                    "playerName": token.player_name,
                    "clientId": token.client_id,
                }),
            );
        }
        if let Some(parent) = Path::new(&self.path).parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::write(&self.path, Value::Object(map).to_string()) {
            warn!("failed to write session cache: {}", err);
        }
    }
}

/// The result of resolving credentials into something we can join a server
/// with. Offline profiles skip the session-join step entirely.
pub struct Account {
    pub profile: mojang::Profile,
    pub online: bool,
}

/// Resolves a usable profile for `account`, preferring the cached session.
///
/// A cached token that still validates is used as-is. An expired one is
/// refreshed through Yggdrasil (when a client token is present) or through
/// the Microsoft refresh-token flow. Anything that can't be refreshed falls
/// back to the password login, and a blank account name means offline mode.
pub fn resolve(
    cache: &mut SessionCache,
    account: &str,
    username: &str,
    password: Option<&str>,
    client_token: &str,
) -> (LoginResult, Option<Account>) {
    if account.is_empty() {
        let name = if username.is_empty() { "Player" } else { username };
        return (LoginResult::Success, Some(offline_account(name)));
    }

    if let Some(token) = cache.get(account).cloned() {
        if mojang::is_token_valid(&token.access_token) {
            let profile = token.profile();
            return (LoginResult::Success, Some(Account { profile, online: true }));
        }
        let (result, refreshed) = if token.refresh_token.is_some() {
            galena_protocol::protocol::microsoft::login_with_refresh_token(
                token.refresh_token.as_deref().unwrap_or(""),
            )
        } else {
            mojang::refresh(&token)
        };
        if let Some(refreshed) = refreshed {
            let profile = refreshed.profile();
            cache.store(account, refreshed);
            return (LoginResult::Success, Some(Account { profile, online: true }));
        }
        debug!("cached session for {} no longer refreshes: {:?}", account, result);
        cache.remove(account);
    }

    match password {
        Some(password) => {
            let (result, token) = mojang::authenticate(account, password, client_token);
            match token {
                Some(token) => {
                    let profile = token.profile();
                    cache.store(account, token);
                    (LoginResult::Success, Some(Account { profile, online: true }))
                }
                None => (result, None),
            }
        }
        None => (LoginResult::LoginRequired, None),
    }
}

fn offline_account(name: &str) -> Account {
    Account {
        profile: mojang::Profile {
            username: name.to_owned(),
            id: offline_uuid(name),
            access_token: String::new(),
        },
        online: false,
    }
}

/// Derives a stable uuid for offline play from the player name. The version
/// and variant nibbles are forced so it reads as a valid name-based uuid.
pub fn offline_uuid(name: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("OfflinePlayer:{}", name).as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    bytes[6] = (bytes[6] & 0x0F) | 0x30;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_uuid_is_stable() {
        assert_eq!(offline_uuid("Steve"), offline_uuid("Steve"));
        assert_ne!(offline_uuid("Steve"), offline_uuid("Alex"));
    }

    #[test]
    fn offline_uuid_has_version_and_variant_bits() {
        let id = offline_uuid("Steve");
        assert_eq!(id.len(), 32);
        assert_eq!(&id[12..13], "3");
        let variant = u8::from_str_radix(&id[16..17], 16).unwrap();
        assert_eq!(variant & 0xC, 0x8);
    }

    #[test]
    fn cache_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("galena-session-test");
        let path = dir.join("sessions.json");
        let path = path.to_str().unwrap();
        let _ = fs::remove_file(path);

        let mut cache = SessionCache::load(path);
        cache.store(
            "Some@Account.example",
            SessionToken {
                access_token: "at".to_owned(),
                refresh_token: Some("rt".to_owned()),
                player_id: "0123456789abcdef0123456789abcdef".to_owned(),
                player_name: "Steve".to_owned(),
                client_id: "ct".to_owned(),
            },
        );

        let reloaded = SessionCache::load(path);
        let token = reloaded.get("some@account.example").unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        assert_eq!(token.player_name, "Steve");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn blank_account_goes_offline() {
        let dir = std::env::temp_dir().join("galena-session-test-offline");
        let path = dir.join("sessions.json");
        let mut cache = SessionCache::load(path.to_str().unwrap());
        let (result, account) = resolve(&mut cache, "", "Steve", None, "");
        assert_eq!(result, LoginResult::Success);
        let account = account.unwrap();
        assert!(!account.online);
        assert_eq!(account.profile.username, "Steve");
        assert!(!account.profile.id.is_empty());
    }
}
