//! Load a router key export into a table and print per-ASN lookups
//!
//! Usage: `spki-load <keys.json> [asn ...]`
//!
//! Without ASN arguments the whole table is printed in insertion order.
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
use rtrkeys_spki::{import_file, SourceId, SpkiTable, TracingObserver};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> Result<()> {
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging_with_format("spki-load", config.log_level(), config.log_format);

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: spki-load <keys.json> [asn ...]")?;
    let asns = args
        .map(|arg| {
            arg.trim_start_matches("AS")
                .parse::<u32>()
                .with_context(|| format!("invalid ASN '{}'", arg))
        })
        .collect::<Result<Vec<u32>>>()?;

    let capacity = config.table.initial_capacity;
    let mut table = SpkiTable::with_capacity(capacity)
        .with_context(|| format!("Failed to reserve a table for {} router keys", capacity))?;
    if config.table.notify_updates {
        table = table.with_observer(Arc::new(TracingObserver));
    }

    let summary = import_file(&table, &path, SourceId::next())
        .with_context(|| format!("Failed to import {}", path))?;
    info!(
        added = summary.added,
        duplicates = summary.duplicates,
        total = table.len(),
        "Router key table loaded"
    );

    let output = if asns.is_empty() {
        serde_json::to_string_pretty(&table.records())?
    } else {
        let mut by_asn = BTreeMap::new();
        for asn in asns {
            let keys = table.get_all(asn);
            if keys.is_empty() {
                warn!(asn = asn, "No router keys for ASN");
            }
            by_asn.insert(asn, keys);
        }
        serde_json::to_string_pretty(&by_asn)?
    };
    println!("{}", output);

    table.free();
    Ok(())
}
