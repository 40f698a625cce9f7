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

//! Detects modded servers from their status response. Both the FML
//! (`modinfo`) and FML2 (`forgeData`) layouts are recognised.

use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct ForgeMod {
    pub modid: String,
    pub version: String,
}

#[derive(Clone, Debug)]
pub struct ForgeInfo {
    pub fml_version: u8,
    pub mods: Vec<ForgeMod>,
}

impl ForgeInfo {
    /// Pulls the mod list out of a decoded status response. `None` for
    /// vanilla servers.
    pub fn from_status(status: &Value) -> Option<ForgeInfo> {
        if let Some(modinfo) = status.get("modinfo") {
            let mods = mod_list(modinfo.get("modList")?, "modid")?;
            return Some(ForgeInfo {
                fml_version: 1,
                mods,
            });
        }
        if let Some(forge_data) = status.get("forgeData") {
            let mods = mod_list(forge_data.get("mods")?, "modId")?;
            return Some(ForgeInfo {
                fml_version: 2,
                mods,
            });
        }
        None
    }
}

fn mod_list(val: &Value, id_key: &str) -> Option<Vec<ForgeMod>> {
    let entries = val.as_array()?;
    let mut mods = Vec::with_capacity(entries.len());
    for entry in entries {
        mods.push(ForgeMod {
            modid: entry.get(id_key)?.as_str()?.to_owned(),
            version: entry
                .get("version")
                .or_else(|| entry.get("modmarker"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_owned(),
        });
    }
    Some(mods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vanilla_status_has_no_mods() {
        let status = json!({"version": {"name": "1.18.2", "protocol": 758}});
        assert!(ForgeInfo::from_status(&status).is_none());
    }

    #[test]
    fn fml_mod_list() {
        let status = json!({
            "modinfo": {
                "type": "FML",
                "modList": [
                    {"modid": "forge", "version": "14.23.5.2860"},
                    {"modid": "jei", "version": "4.16.1.302"},
                ],
            },
        });
        let info = ForgeInfo::from_status(&status).unwrap();
        assert_eq!(info.fml_version, 1);
        assert_eq!(info.mods.len(), 2);
        assert_eq!(info.mods[0].modid, "forge");
    }

    #[test]
    fn fml2_mod_list() {
        let status = json!({
            "forgeData": {
                "fmlNetworkVersion": 2,
                "mods": [
                    {"modId": "forge", "modmarker": "ANY"},
                ],
            },
        });
        let info = ForgeInfo::from_status(&status).unwrap();
        assert_eq!(info.fml_version, 2);
        assert_eq!(info.mods[0].modid, "forge");
        assert_eq!(info.mods[0].version, "ANY");
    }

    #[test]
    fn malformed_mod_entries_reject_the_list() {
        let status = json!({
            "modinfo": {"modList": [{"version": "only"}]},
        });
        assert!(ForgeInfo::from_status(&status).is_none());
    }
}
