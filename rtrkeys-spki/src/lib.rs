//! Router key (SPKI) table for RPKI-RTR clients
//!
//! Holds BGPsec router keys received from one or more RPKI caches, indexed
//! by ASN for lookups and by insertion order for per-cache purges.
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


pub mod compare;
pub mod error;
pub mod import;
mod index;
pub mod observer;
pub mod record;
pub mod store;
pub mod table;

pub use error::{SpkiError, SpkiResult};
pub use import::{import_file, parse_router_keys, ImportSummary};
pub use observer::{SpkiEvent, SpkiObserver, TracingObserver};
pub use record::{Ski, SourceId, Spki, SpkiRecord, SKI_SIZE, SPKI_SIZE};
pub use store::{apply_router_key, SpkiStore};
pub use table::SpkiTable;
