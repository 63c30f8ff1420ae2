//! Loading router keys from JSON exports
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


use crate::error::{SpkiError, SpkiResult};
use crate::record::{SourceId, SpkiRecord};
use crate::table::SpkiTable;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// One router key as written in an export file
#[derive(Debug, Clone, Deserialize)]
pub struct RouterKeyEntry {
    pub asn: u32,
    /// Hex encoded SKI
    pub ski: String,
    /// Hex encoded SPKI
    pub spki: String,
    /// Source handle; entries without one use the loader's default
    #[serde(default)]
    pub source: Option<u64>,
}

/// Export file layout: `{ "router_keys": [ ... ] }`
#[derive(Debug, Clone, Deserialize)]
pub struct RouterKeyFile {
    pub router_keys: Vec<RouterKeyEntry>,
}

/// Counts from loading a file into a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
}

impl RouterKeyEntry {
    pub fn to_record(&self, default_source: SourceId) -> SpkiResult<SpkiRecord> {
        let ski = decode_hex("SKI", &self.ski)?;
        let spki = decode_hex("SPKI", &self.spki)?;
        let source = self.source.map(SourceId::new).unwrap_or(default_source);
        SpkiRecord::from_slices(self.asn, &ski, &spki, source)
    }
}

fn decode_hex(field: &str, value: &str) -> SpkiResult<Vec<u8>> {
    hex::decode(value.trim())
        .map_err(|e| SpkiError::Import(format!("{} is not valid hex: {}", field, e)))
}

/// Parse an export document into records
pub fn parse_router_keys(json: &str, default_source: SourceId) -> SpkiResult<Vec<SpkiRecord>> {
    let file: RouterKeyFile =
        serde_json::from_str(json).map_err(|e| SpkiError::Import(e.to_string()))?;
    file.router_keys
        .iter()
        .map(|entry| entry.to_record(default_source))
        .collect()
}

/// Read an export file and add every key to `table`.
///
/// Keys already present are counted, not treated as failures.
pub fn import_file<P: AsRef<Path>>(
    table: &SpkiTable,
    path: P,
    default_source: SourceId,
) -> SpkiResult<ImportSummary> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| SpkiError::Import(format!("{}: {}", path.display(), e)))?;
    let records = parse_router_keys(&json, default_source)?;

    let mut summary = ImportSummary::default();
    for record in records {
        match table.add(record) {
            Ok(()) => summary.added += 1,
            Err(e) if e.is_duplicate() => {
                debug!(error = %e, "Skipping duplicate router key");
                summary.duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        path = %path.display(),
        added = summary.added,
        duplicates = summary.duplicates,
        "Router keys imported"
    );
    Ok(summary)
}
