//! Router key record definitions
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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of a Subject Key Identifier in bytes
pub const SKI_SIZE: usize = 20;

/// Size of an encoded Subject Public Key Info in bytes
pub const SPKI_SIZE: usize = 91;

/// Subject Key Identifier
pub type Ski = [u8; SKI_SIZE];

/// Subject Public Key Info
pub type Spki = [u8; SPKI_SIZE];

/// Opaque handle of the upstream cache connection a record came from.
///
/// The table never owns or dereferences a source; it only compares handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(u64);

impl SourceId {
    /// Wrap a raw handle value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a process-unique handle
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw handle value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// A router key as announced by an RPKI cache
///
/// Derived equality compares every field, source included. Table matching
/// uses [`crate::compare::exact_match`], which ignores the source.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpkiRecord {
    /// Subject Key Identifier
    #[serde(with = "hex_bytes")]
    pub ski: Ski,
    /// Autonomous System Number the key is bound to
    pub asn: u32,
    /// Encoded public key
    #[serde(with = "hex_bytes")]
    pub spki: Spki,
    /// Upstream connection that announced the key
    pub source: SourceId,
}

impl SpkiRecord {
    pub fn new(asn: u32, ski: Ski, spki: Spki, source: SourceId) -> Self {
        Self {
            ski,
            asn,
            spki,
            source,
        }
    }

    /// Build a record from byte slices as they arrive in a Router Key PDU
    pub fn from_slices(asn: u32, ski: &[u8], spki: &[u8], source: SourceId) -> SpkiResult<Self> {
        let ski: Ski = ski.try_into().map_err(|_| SpkiError::InvalidLength {
            field: "SKI",
            expected: SKI_SIZE,
            actual: ski.len(),
        })?;
        let spki: Spki = spki.try_into().map_err(|_| SpkiError::InvalidLength {
            field: "SPKI",
            expected: SPKI_SIZE,
            actual: spki.len(),
        })?;
        Ok(Self::new(asn, ski, spki, source))
    }

    /// SKI as lowercase hex
    pub fn ski_hex(&self) -> String {
        hex::encode(self.ski)
    }
}

impl fmt::Debug for SpkiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpkiRecord")
            .field("asn", &self.asn)
            .field("ski", &self.ski_hex())
            .field("spki", &format_args!("{}..", hex::encode(&self.spki[..8])))
            .field("source", &self.source)
            .finish()
    }
}

/// Serde adapter writing fixed-size byte arrays as hex strings
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(&encoded).map_err(serde::de::Error::custom)?;
        <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::custom(format!("expected {} bytes, got {}", N, bytes.len()))
        })
    }
}
