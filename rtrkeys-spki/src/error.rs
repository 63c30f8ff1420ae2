//! Error types for the router key table
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


use std::collections::TryReserveError;
use thiserror::Error;

/// Router key table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpkiError {
    /// An identical record (ASN, SKI and SPKI) is already stored
    #[error("Duplicate router key for AS{asn}")]
    Duplicate { asn: u32 },

    /// No stored record matches the descriptor
    #[error("Router key not found for AS{asn}")]
    NotFound { asn: u32 },

    /// Table storage could not grow; nothing was modified
    #[error("Allocation failure: {0}")]
    Allocation(String),

    /// Hash index and ordered list disagree
    #[error("Table inconsistency: {0}")]
    Inconsistent(String),

    /// Byte input had the wrong size for a fixed-width field
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Router key file could not be read
    #[error("Import error: {0}")]
    Import(String),
}

impl SpkiError {
    /// Whether this is the `Duplicate` outcome of an insertion
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SpkiError::Duplicate { .. })
    }

    /// Whether this is the `NotFound` outcome of a removal
    pub fn is_not_found(&self) -> bool {
        matches!(self, SpkiError::NotFound { .. })
    }
}

impl From<TryReserveError> for SpkiError {
    fn from(e: TryReserveError) -> Self {
        SpkiError::Allocation(e.to_string())
    }
}

/// Result type for table operations
pub type SpkiResult<T> = Result<T, SpkiError>;
