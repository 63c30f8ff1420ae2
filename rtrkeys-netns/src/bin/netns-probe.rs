//! Check that the configured namespace can host an RTR cache connection
//!
//! Reads `RTRKEYS_NETNS_ENABLE` / `RTRKEYS_NETNS_NAME`, verifies the
//! namespace exists and opens a TCP socket inside it.
// Copyright 2025 Francisco F. Pinochet
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


use anyhow::{Context, Result};
use rtrkeys_config::AppConfig;
use rtrkeys_logging::init_logging_with_format;
use rtrkeys_netns::{AddressFamily, NetnsContext, SockType};
use std::os::fd::AsRawFd;
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging_with_format("netns-probe", config.log_level(), config.log_format);

    let context = NetnsContext::from_config(&config.netns);
    let namespace = config.netns.namespace.as_deref();
    info!(
        enabled = config.netns.enabled,
        available = context.is_available(),
        namespace = namespace.unwrap_or("-"),
        "Namespace support"
    );

    context
        .api_usable(namespace)
        .context("Namespace is not usable")?;

    let fd = context
        .create_socket(AddressFamily::Inet, SockType::Stream, None, namespace)
        .context("Failed to create socket")?;
    info!(fd = fd.as_raw_fd(), "Socket created");

    Ok(())
}
