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

use galena_protocol::protocol::packet::configuration::serverbound::ConfigPluginMessageServerbound;
use galena_protocol::protocol::packet::play::serverbound::PluginMessageServerbound;
use galena_protocol::protocol::Serializable;

pub const BRAND_CHANNEL: &str = "minecraft:brand";

pub struct Brand {
    pub brand: String,
}

impl Brand {
    fn payload(&self) -> Vec<u8> {
        let mut data = vec![];
        Serializable::write_to(&self.brand, &mut data).unwrap();
        data
    }

    pub fn as_message(self) -> PluginMessageServerbound {
        PluginMessageServerbound {
            channel: BRAND_CHANNEL.into(),
            data: self.payload(),
        }
    }

    /// 1.20.2+ sends the brand during the configuration phase instead.
    pub fn as_config_message(self) -> ConfigPluginMessageServerbound {
        ConfigPluginMessageServerbound {
            channel: BRAND_CHANNEL.into(),
            data: self.payload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_payload_is_a_length_prefixed_string() {
        let msg = Brand {
            brand: "galena".to_owned(),
        }
        .as_message();
        assert_eq!(msg.channel, BRAND_CHANNEL);
        assert_eq!(msg.data, b"\x06galena");
    }
}
