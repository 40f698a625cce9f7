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

use galena::{auth, console, server};
use galena_protocol::protocol;
use log::{error, info, warn};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

const CL_BRAND: console::CVar<String> = console::CVar {
    ty: PhantomData,
    name: "cl_brand",
    description: "cl_brand has the value of the client's current 'brand'. \
                  e.g. \"galena\" or \"Vanilla\"",
    mutable: false,
    serializable: false,
    default: &|| "galena".to_owned(),
};

const SESSION_CACHE: &str = "sessions.json";

#[derive(StructOpt, Debug)]
#[structopt(name = "galena")]
struct Opt {
    /// Server to connect to, as host or host:port
    server: String,

    /// Player name, or account name for online-mode login
    #[structopt(short, long)]
    username: Option<String>,

    /// Account password. Without it a cached session or offline mode is used
    #[structopt(short, long)]
    password: Option<String>,

    /// Protocol version to speak, by number ("765") or name ("1.20.4")
    #[structopt(long)]
    protocol: Option<String>,

    /// Ping the server and print its status instead of joining
    #[structopt(long)]
    status: bool,

    /// Log every packet read and written
    #[structopt(long)]
    network_debug: bool,
}

fn main() {
    let opt = Opt::from_args();

    let con = Arc::new(Mutex::new(console::Console::new()));
    {
        let mut con = con.lock().unwrap();
        con.register(CL_BRAND);
        auth::register_vars(&mut con);
        con.load_config();
        con.save_config();
    }

    let proxy = console::ConsoleProxy::new(con.clone());
    log::set_boxed_logger(Box::new(proxy)).unwrap();
    log::set_max_level(log::LevelFilter::Trace);

    if opt.network_debug {
        protocol::enable_network_debug();
    }

    let protocol_version = match opt.protocol.as_deref() {
        Some(requested) => {
            let version = requested
                .parse::<i32>()
                .unwrap_or_else(|_| protocol::protocol_version_by_name(requested));
            if !protocol::is_supported(version) {
                error!("unsupported protocol version {:?}", requested);
                std::process::exit(1);
            }
            version
        }
        None => protocol::SUPPORTED_PROTOCOLS[0],
    };

    if opt.status {
        ping_server(&opt.server, protocol_version);
        return;
    }

    let (username, account, client_token) = {
        let con = con.lock().unwrap();
        let configured = con.get(auth::CL_USERNAME).clone();
        let username = opt.username.unwrap_or(configured);
        (
            username,
            con.get(auth::AUTH_ACCOUNT).clone(),
            con.get(auth::AUTH_CLIENT_TOKEN).clone(),
        )
    };

    let mut cache = auth::SessionCache::load(SESSION_CACHE);
    let (result, account) = auth::resolve(
        &mut cache,
        &account,
        &username,
        opt.password.as_deref(),
        &client_token,
    );
    let account = match account {
        Some(account) => account,
        None => {
            error!("login failed: {:?}", result);
            std::process::exit(1);
        }
    };

    info!(
        "connecting to {} as {} (protocol {}, {})",
        opt.server,
        account.profile.username,
        protocol_version,
        protocol::protocol_name_by_version(protocol_version)
    );

    let mut server = match server::Server::connect(
        account.profile,
        account.online,
        &opt.server,
        protocol_version,
    ) {
        Ok(server) => server,
        Err(err) => {
            error!("failed to connect: {}", err);
            std::process::exit(1);
        }
    };

    // One server tick per 50ms, delta expressed in 60fps frame units.
    let frame_time = 1e9f64 / 60.0;
    let mut last_frame = Instant::now();
    while server.is_connected() {
        thread::sleep(Duration::from_millis(50));
        let now = Instant::now();
        let delta = (now.duration_since(last_frame).as_nanos() as f64) / frame_time;
        last_frame = now;

        server.tick(delta);
        for event in server.poll_events() {
            match event {
                server::Event::ChunkReceived { x, z } => {
                    info!("received chunk {},{}", x, z);
                }
                server::Event::Disconnect(reason) => {
                    warn!("disconnected: {}", reason);
                }
                server::Event::EntityMetadata { .. } => {}
            }
        }
    }
}

fn ping_server(address: &str, protocol_version: i32) {
    let limit = Duration::from_secs(20);
    match protocol::probe_server(address, protocol_version, limit) {
        Some(Ok((status, ping))) => {
            if status.version.protocol <= 1 {
                error!("{}: no version reported", address);
            } else if status.version.protocol != protocol_version {
                info!(
                    "{} speaks protocol {} ({}), not {}",
                    address, status.version.protocol, status.version.name, protocol_version
                );
            }
            info!(
                "{}: {} [{}/{}] {}ms",
                address,
                status.description,
                status.players.online,
                status.players.max,
                ping.as_millis()
            );
            if let Some(forge_mods) = status.forge_mods {
                info!("{}: {} forge mods", address, forge_mods.mods.len());
            }
        }
        Some(Err(err)) => {
            error!("{}: status failed: {}", address, err);
            std::process::exit(1);
        }
        None => {
            error!("{}: no response within {:?}", address, limit);
            std::process::exit(1);
        }
    }
}
