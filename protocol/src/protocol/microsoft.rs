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

//! Microsoft account login. A chain of token exchanges: MSA OAuth
//! token, Xbox Live user token, XSTS token, then the Minecraft
//! services token that the session server accepts.

use crate::protocol::mojang::{LoginResult, SessionToken, HTTP_TIMEOUT};
use log::debug;
use serde_json::json;

const CLIENT_ID: &str = "00000000402b5328";
const SCOPE: &str = "service::user.auth.xboxlive.com::MBI_SSL";
const REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";

const MSA_TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";
const XBL_AUTH_URL: &str = "https://user.auth.xboxlive.com/user/authenticate";
const XSTS_AUTH_URL: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
const MC_LOGIN_URL: &str = "https://api.minecraftservices.com/authentication/login_with_xbox";
const MC_ENTITLEMENTS_URL: &str = "https://api.minecraftservices.com/entitlements/mcstore";
const MC_PROFILE_URL: &str = "https://api.minecraftservices.com/minecraft/profile";

/// The login page to open in a browser. The resulting redirect carries
/// the authorization code to pass to [`login_with_code`].
pub fn oauth_url() -> String {
    format!(
        "https://login.live.com/oauth20_authorize.srf?client_id={}&response_type=code&scope={}&redirect_uri={}",
        CLIENT_ID, SCOPE, REDIRECT_URI
    )
}

/// First time login with the authorization code from the browser
/// redirect.
pub fn login_with_code(code: &str) -> (LoginResult, Option<SessionToken>) {
    run_chain(&[
        ("client_id", CLIENT_ID),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", REDIRECT_URI),
        ("scope", SCOPE),
    ])
}

/// Re-login with a refresh token saved from a previous session.
pub fn login_with_refresh_token(refresh_token: &str) -> (LoginResult, Option<SessionToken>) {
    run_chain(&[
        ("client_id", CLIENT_ID),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
        ("redirect_uri", REDIRECT_URI),
        ("scope", SCOPE),
    ])
}

// Any failure along the chain collapses into WrongPassword. The
// individual hop errors carry no reliable structure to map further.
fn run_chain(msa_form: &[(&str, &str)]) -> (LoginResult, Option<SessionToken>) {
    match chain(msa_form) {
        Ok(val) => val,
        Err(err) => {
            debug!("microsoft login chain failed: {}", err);
            (LoginResult::WrongPassword, None)
        }
    }
}

fn chain(msa_form: &[(&str, &str)]) -> Result<(LoginResult, Option<SessionToken>), ChainError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let msa: serde_json::Value = client
        .post(MSA_TOKEN_URL)
        .form(msa_form)
        .send()?
        .error_for_status()?
        .json()?;
    let msa_access = field(&msa, &["access_token"])?;
    let msa_refresh = field(&msa, &["refresh_token"])?.to_owned();

    let xbl: serde_json::Value = client
        .post(XBL_AUTH_URL)
        .json(&json!({
            "Properties": {
                "AuthMethod": "RPS",
                "SiteName": "user.auth.xboxlive.com",
                "RpsTicket": msa_access,
            },
            "RelyingParty": "http://auth.xboxlive.com",
            "TokenType": "JWT",
        }))
        .send()?
        .error_for_status()?
        .json()?;
    let xbl_token = field(&xbl, &["Token"])?.to_owned();
    let user_hash = xbl
        .pointer("/DisplayClaims/xui/0/uhs")
        .and_then(|v| v.as_str())
        .ok_or(ChainError::MissingField("uhs"))?
        .to_owned();

    let xsts: serde_json::Value = client
        .post(XSTS_AUTH_URL)
        .json(&json!({
            "Properties": {
                "SandboxId": "RETAIL",
                "UserTokens": [xbl_token],
            },
            "RelyingParty": "rp://api.minecraftservices.com/",
            "TokenType": "JWT",
        }))
        .send()?
        .error_for_status()?
        .json()?;
    let xsts_token = field(&xsts, &["Token"])?;

    let mc: serde_json::Value = client
        .post(MC_LOGIN_URL)
        .json(&json!({
            "identityToken": format!("XBL3.0 x={};{}", user_hash, xsts_token),
        }))
        .send()?
        .error_for_status()?
        .json()?;
    let mc_token = field(&mc, &["access_token"])?.to_owned();

    let entitlements: serde_json::Value = client
        .get(MC_ENTITLEMENTS_URL)
        .bearer_auth(&mc_token)
        .send()?
        .error_for_status()?
        .json()?;
    let owns_game = entitlements
        .get("items")
        .and_then(|v| v.as_array())
        .map_or(false, |items| !items.is_empty());
    if !owns_game {
        return Ok((LoginResult::NotPremium, None));
    }

    let profile: serde_json::Value = client
        .get(MC_PROFILE_URL)
        .bearer_auth(&mc_token)
        .send()?
        .error_for_status()?
        .json()?;

    Ok((
        LoginResult::Success,
        Some(SessionToken {
            access_token: mc_token,
            refresh_token: Some(msa_refresh),
            player_id: field(&profile, &["id"])?.to_owned(),
            player_name: field(&profile, &["name"])?.to_owned(),
            client_id: String::new(),
        }),
    ))
}

fn field<'a>(val: &'a serde_json::Value, path: &[&'static str]) -> Result<&'a str, ChainError> {
    let mut cur = val;
    for key in path {
        cur = cur.get(key).ok_or(ChainError::MissingField(key))?;
    }
    cur.as_str()
        .ok_or(ChainError::MissingField(path[path.len() - 1]))
}

#[derive(Debug)]
enum ChainError {
    Http(reqwest::Error),
    MissingField(&'static str),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChainError::Http(err) => write!(f, "http error: {}", err),
            ChainError::MissingField(field) => write!(f, "response missing field {}", field),
        }
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> ChainError {
        ChainError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_url_carries_client_id() {
        let url = oauth_url();
        assert!(url.contains(CLIENT_ID));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn missing_fields_are_reported() {
        let val = serde_json::json!({ "Token": "abc" });
        assert_eq!(field(&val, &["Token"]).unwrap(), "abc");
        assert!(field(&val, &["missing"]).is_err());
    }
}
