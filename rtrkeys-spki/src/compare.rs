//! Record matching rules used by the table
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


use crate::record::SpkiRecord;

/// Exact match: ASN, SKI and SPKI all equal. The source is not compared,
/// so the same key announced by two caches counts as a duplicate.
pub fn exact_match(a: &SpkiRecord, b: &SpkiRecord) -> bool {
    a.asn == b.asn && a.ski == b.ski && a.spki == b.spki
}

/// ASN-only match for multi-result queries
pub fn asn_match(asn: u32, record: &SpkiRecord) -> bool {
    record.asn == asn
}
