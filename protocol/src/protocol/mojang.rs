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

use crate::protocol::Error;
use log::warn;
use serde_json::json;
use sha1::{Digest, Sha1};
use std::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

const AUTHENTICATE_URL: &str = "https://authserver.mojang.com/authenticate";
const REFRESH_URL: &str = "https://authserver.mojang.com/refresh";
const JOIN_URL: &str = "https://sessionserver.mojang.com/session/minecraft/join";
const REALMS_BASE: &str = "https://pc.realms.minecraft.net";

/// Every call site gets a hard wall clock limit on the whole request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of an authentication call. Surfaced as a value, never as an
/// error, so callers always get exactly one of these back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginResult {
    OtherError,
    ServiceUnavailable,
    SSLError,
    Success,
    WrongPassword,
    AccountMigrated,
    NotPremium,
    LoginRequired,
    InvalidToken,
    InvalidResponse,
    NullError,
    UserCancel,
}

/// Tokens and identity for a logged in account.
#[derive(Clone, Debug, Default)]
pub struct SessionToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub player_id: String,
    pub player_name: String,
    pub client_id: String,
}

impl SessionToken {
    pub fn profile(&self) -> Profile {
        Profile {
            username: self.player_name.clone(),
            id: self.player_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Profile {
    pub username: String,
    pub id: String,
    pub access_token: String,
}

impl Profile {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.id.is_empty() && !self.access_token.is_empty()
    }

    /// Notifies the session server that this profile is joining the
    /// given server. Required before the encryption response when the
    /// server runs in online mode.
    pub fn join_server(
        &self,
        server_id: &str,
        shared_key: &[u8],
        public_key: &[u8],
    ) -> Result<(), Error> {
        let hash_str = server_hash(server_id, shared_key, public_key);

        let join_msg = json!({
            "accessToken": &self.access_token,
            "selectedProfile": &self.id,
            "serverId": hash_str,
        });
        let join = serde_json::to_string(&join_msg)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        let res = client
            .post(JOIN_URL)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(join)
            .send()?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(Error::Err(format!(
                "session server rejected the join: {}",
                res.status()
            )))
        }
    }
}

/// Computes the hex digest the session server expects: sha1 over the
/// server id, shared secret and public key, rendered as a signed
/// magnitude with leading zeros stripped.
pub fn server_hash(server_id: &str, shared_key: &[u8], public_key: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(server_id.as_bytes());
    hasher.update(shared_key);
    hasher.update(public_key);
    let mut hash = hasher.finalize().to_vec();

    // Mojang hashes are hex renderings of a signed big integer.
    let negative = (hash[0] & 0x80) == 0x80;
    if negative {
        twos_complement(&mut hash);
    }
    let hex = hex::encode(&hash);
    let trimmed = hex.trim_start_matches('0');
    if negative {
        format!("-{}", trimmed)
    } else {
        trimmed.to_owned()
    }
}

fn twos_complement(data: &mut [u8]) {
    let mut carry = true;
    for b in data.iter_mut().rev() {
        *b = !*b;
        if carry {
            carry = *b == 0xFF;
            *b = b.wrapping_add(1);
        }
    }
}

/// Maps a raw yggdrasil response onto the login taxonomy. Pure so the
/// table is testable without the network.
pub fn classify_yggdrasil_response(status: u16, body: &str) -> LoginResult {
    match status {
        200..=299 => {
            // A valid login for an account that owns no game profile
            // comes back 200 with an empty profile list.
            if body.contains("\"availableProfiles\":[]") {
                LoginResult::NotPremium
            } else {
                LoginResult::Success
            }
        }
        403 => {
            if body.contains("UserMigratedException") {
                LoginResult::AccountMigrated
            } else {
                LoginResult::WrongPassword
            }
        }
        503 => LoginResult::ServiceUnavailable,
        _ => LoginResult::OtherError,
    }
}

fn classify_transport(err: &reqwest::Error) -> LoginResult {
    let text = format!("{:?}", err).to_lowercase();
    if text.contains("ssl") || text.contains("tls") || text.contains("certificate") {
        LoginResult::SSLError
    } else {
        LoginResult::OtherError
    }
}

fn token_from_response(val: &serde_json::Value, client_token: &str) -> Option<SessionToken> {
    let access_token = val.get("accessToken")?.as_str()?;
    let profile = val.get("selectedProfile")?;
    Some(SessionToken {
        access_token: access_token.to_owned(),
        refresh_token: None,
        player_id: profile.get("id")?.as_str()?.to_owned(),
        player_name: profile.get("name")?.as_str()?.to_owned(),
        client_id: val
            .get("clientToken")
            .and_then(|v| v.as_str())
            .unwrap_or(client_token)
            .to_owned(),
    })
}

fn post_yggdrasil(url: &str, body: serde_json::Value) -> Result<(u16, String), reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let res = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .send()?;
    let status = res.status().as_u16();
    let text = res.text()?;
    Ok((status, text))
}

/// Password login against the yggdrasil auth server.
pub fn authenticate(
    username: &str,
    password: &str,
    client_token: &str,
) -> (LoginResult, Option<SessionToken>) {
    let body = json!({
        "agent": {
            "name": "Minecraft",
            "version": 1,
        },
        "username": username,
        "password": password,
        "clientToken": client_token,
        "requestUser": true,
    });
    finish_yggdrasil(AUTHENTICATE_URL, body, client_token)
}

/// Exchanges a stale access token for a fresh one.
pub fn refresh(token: &SessionToken) -> (LoginResult, Option<SessionToken>) {
    let body = json!({
        "accessToken": &token.access_token,
        "clientToken": &token.client_id,
    });
    finish_yggdrasil(REFRESH_URL, body, &token.client_id)
}

fn finish_yggdrasil(
    url: &str,
    body: serde_json::Value,
    client_token: &str,
) -> (LoginResult, Option<SessionToken>) {
    let (status, text) = match post_yggdrasil(url, body) {
        Ok(val) => val,
        Err(err) => return (classify_transport(&err), None),
    };
    let result = classify_yggdrasil_response(status, &text);
    if result != LoginResult::Success {
        return (result, None);
    }
    let val: serde_json::Value = match serde_json::from_str(&text) {
        Ok(val) => val,
        Err(_) => return (LoginResult::InvalidResponse, None),
    };
    match token_from_response(&val, client_token) {
        Some(token) => (LoginResult::Success, Some(token)),
        None => (LoginResult::InvalidResponse, None),
    }
}

/// Checks whether an access token is still usable by decoding the jwt
/// payload segment and comparing its expiry against the clock. The
/// signature is not verified, only the timestamp matters here.
pub fn is_token_valid(access_token: &str) -> bool {
    match jwt_expiry(access_token) {
        Some(exp) => exp > unix_time_secs(),
        None => false,
    }
}

fn jwt_expiry(token: &str) -> Option<i64> {
    let seg = token.split('.').nth(1)?;
    let data = base64::decode_config(seg, base64::URL_SAFE_NO_PAD).ok()?;
    let val: serde_json::Value = serde_json::from_slice(&data).ok()?;
    val.get("exp")?.as_i64()
}

fn unix_time_secs() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(dur) => dur.as_secs() as i64,
        Err(_) => 0,
    }
}

#[derive(Clone, Debug)]
pub struct RealmsServer {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub expired: bool,
}

fn realms_cookie(token: &SessionToken, version_name: &str) -> String {
    format!(
        "sid=token:{}:{};user={};version={}",
        token.access_token, token.player_id, token.player_name, version_name
    )
}

fn realms_get(path: &str, token: &SessionToken, version_name: &str) -> Result<String, Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let res = client
        .get(format!("{}{}", REALMS_BASE, path))
        .header(reqwest::header::COOKIE, realms_cookie(token, version_name))
        .send()?;
    if !res.status().is_success() {
        return Err(Error::Err(format!("realms request failed: {}", res.status())));
    }
    Ok(res.text()?)
}

/// Fetches the list of realms worlds available to the account.
pub fn realms_worlds(
    token: &SessionToken,
    version_name: &str,
) -> Result<Vec<RealmsServer>, Error> {
    let text = realms_get("/worlds", token, version_name)?;
    let val: serde_json::Value = serde_json::from_str(&text)?;
    let servers = val
        .get("servers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Err("realms world list missing servers".to_owned()))?;
    let mut out = Vec::with_capacity(servers.len());
    for server in servers {
        let id = match server.get("id").and_then(|v| v.as_i64()) {
            Some(id) => id,
            None => {
                warn!("skipping realms world without an id");
                continue;
            }
        };
        out.push(RealmsServer {
            id,
            name: server
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_owned(),
            owner: server
                .get("owner")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_owned(),
            expired: server
                .get("expired")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        });
    }
    Ok(out)
}

/// Resolves the join address for a realms world. The realm may still be
/// starting up, in which case the address is not available yet.
pub fn realms_join_address(
    token: &SessionToken,
    version_name: &str,
    world_id: i64,
) -> Result<String, Error> {
    let text = realms_get(
        &format!("/worlds/v1/{}/join/pc", world_id),
        token,
        version_name,
    )?;
    let val: serde_json::Value = serde_json::from_str(&text)?;
    val.get("address")
        .and_then(|v| v.as_str())
        .map(|v| v.to_owned())
        .ok_or_else(|| Error::Err("realms world has no address yet".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_hash_known_values() {
        assert_eq!(
            server_hash("Notch", &[], &[]),
            "4ed1f46bbe04bc756bcb17c0c7ce3e4632f06a48"
        );
        assert_eq!(
            server_hash("jeb_", &[], &[]),
            "-7c9d5b0044c130109a5d7b5fb5c317c02b4e28c1"
        );
        assert_eq!(
            server_hash("simon", &[], &[]),
            "88e16a1019277b15d58faf0541e11910eb756f6"
        );
    }

    #[test]
    fn yggdrasil_status_mapping() {
        assert_eq!(
            classify_yggdrasil_response(200, "{\"accessToken\":\"a\"}"),
            LoginResult::Success
        );
        assert_eq!(
            classify_yggdrasil_response(200, "{\"availableProfiles\":[]}"),
            LoginResult::NotPremium
        );
        assert_eq!(
            classify_yggdrasil_response(403, "{\"error\":\"ForbiddenOperationException\"}"),
            LoginResult::WrongPassword
        );
        assert_eq!(
            classify_yggdrasil_response(403, "{\"error\":\"UserMigratedException\"}"),
            LoginResult::AccountMigrated
        );
        assert_eq!(classify_yggdrasil_response(503, ""), LoginResult::ServiceUnavailable);
        assert_eq!(classify_yggdrasil_response(418, ""), LoginResult::OtherError);
    }

    fn fake_jwt(exp: i64) -> String {
        let payload = serde_json::json!({ "exp": exp }).to_string();
        format!(
            "x.{}.y",
            base64::encode_config(payload, base64::URL_SAFE_NO_PAD)
        )
    }

    #[test]
    fn jwt_expiry_classification() {
        assert!(!is_token_valid(&fake_jwt(1)));
        assert!(is_token_valid(&fake_jwt(unix_time_secs() + 3600)));
        assert!(!is_token_valid("not-a-jwt"));
        assert!(!is_token_valid("a.!!!.c"));
    }

    #[test]
    fn incomplete_profile() {
        let profile = Profile {
            username: "steve".to_owned(),
            id: String::new(),
            access_token: "token".to_owned(),
        };
        assert!(!profile.is_complete());
    }
}
