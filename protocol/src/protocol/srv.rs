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

use crate::protocol::timeout;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::Resolver;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub target: String,
    pub port: u16,
}

/// Resolves `_minecraft._tcp.<host>` and picks one record. Lookup
/// failures and timeouts are not fatal, the caller just connects to the
/// plain hostname instead.
pub fn lookup(host: &str) -> Option<(String, u16)> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }
    let name = format!("_minecraft._tcp.{}", host);
    let records = timeout::perform(move || resolve(&name), LOOKUP_TIMEOUT)??;
    let mut rng = rand::thread_rng();
    let picked = pick(&records, &mut rng)?;
    debug!(
        "srv record points at {}:{} (priority {}, weight {})",
        picked.target, picked.port, picked.priority, picked.weight
    );
    Some((picked.target.clone(), picked.port))
}

fn resolve(name: &str) -> Option<Vec<SrvRecord>> {
    let resolver = match Resolver::from_system_conf() {
        Ok(resolver) => resolver,
        Err(_) => match Resolver::new(ResolverConfig::default(), ResolverOpts::default()) {
            Ok(resolver) => resolver,
            Err(err) => {
                warn!("failed to build a dns resolver: {}", err);
                return None;
            }
        },
    };
    let lookup = match resolver.srv_lookup(name) {
        Ok(lookup) => lookup,
        Err(err) => {
            debug!("srv lookup for {} failed: {}", name, err);
            return None;
        }
    };
    let records = lookup
        .iter()
        .map(|srv| SrvRecord {
            priority: srv.priority(),
            weight: srv.weight(),
            target: srv.target().to_utf8().trim_end_matches('.').to_owned(),
            port: srv.port(),
        })
        .collect::<Vec<_>>();
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// RFC 2782 style selection: only the lowest priority group is
/// considered, and within it records are chosen at random in proportion
/// to their weight.
fn pick<'a, R: Rng>(records: &'a [SrvRecord], rng: &mut R) -> Option<&'a SrvRecord> {
    let min = records.iter().map(|r| r.priority).min()?;
    let group: Vec<&SrvRecord> = records.iter().filter(|r| r.priority == min).collect();
    let total: u32 = group.iter().map(|r| u32::from(r.weight)).sum();
    if total == 0 {
        return group.choose(rng).copied();
    }
    let mut roll = rng.gen_range(0..total);
    for record in &group {
        let weight = u32::from(record.weight);
        if weight > roll {
            return Some(record);
        }
        roll -= weight;
    }
    group.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn records() -> Vec<SrvRecord> {
        vec![
            SrvRecord {
                priority: 0,
                weight: 20,
                target: "heavy.example.com".to_owned(),
                port: 25565,
            },
            SrvRecord {
                priority: 0,
                weight: 1,
                target: "light.example.com".to_owned(),
                port: 25566,
            },
            SrvRecord {
                priority: 1,
                weight: 100,
                target: "backup.example.com".to_owned(),
                port: 25567,
            },
        ]
    }

    #[test]
    fn selection_stays_in_the_lowest_priority_group() {
        let records = records();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let picked = pick(&records, &mut rng).unwrap();
            assert_eq!(picked.priority, 0);
        }
    }

    #[test]
    fn selection_favours_heavier_records() {
        let records = records();
        let mut rng = StdRng::seed_from_u64(2);
        let mut heavy = 0;
        let mut light = 0;
        for _ in 0..1000 {
            match pick(&records, &mut rng).unwrap().target.as_str() {
                "heavy.example.com" => heavy += 1,
                "light.example.com" => light += 1,
                other => panic!("unexpected target {}", other),
            }
        }
        assert!(heavy > light * 5, "heavy={} light={}", heavy, light);
    }

    #[test]
    fn zero_weight_groups_still_pick() {
        let records = vec![
            SrvRecord {
                priority: 0,
                weight: 0,
                target: "a.example.com".to_owned(),
                port: 1,
            },
            SrvRecord {
                priority: 0,
                weight: 0,
                target: "b.example.com".to_owned(),
                port: 2,
            },
        ];
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pick(&records, &mut rng).is_some());
    }

    #[test]
    fn empty_record_set() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(pick(&[], &mut rng).is_none());
    }
}
