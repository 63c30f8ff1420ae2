//! Error types for namespace switching
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


use nix::errno::Errno;
use thiserror::Error;

/// Namespace errors
#[derive(Error, Debug)]
pub enum NetnsError {
    #[error("Network namespace not found: {0}")]
    NotFound(String),

    #[error("Failed to enter network namespace {namespace}: {source}")]
    Switch {
        namespace: String,
        #[source]
        source: Errno,
    },

    #[error("Failed to restore default network namespace: {0}")]
    Restore(#[source] Errno),

    #[error("Socket creation failed: {0}")]
    Socket(#[source] Errno),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for namespace operations
pub type NetnsResult<T> = Result<T, NetnsError>;
