//! Network namespace (VRF) support for RTR cache connections
//!
//! Creates sockets inside a named network namespace so a client can reach
//! caches that live in a separate routing context.
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


pub mod context;
pub mod error;

pub use context::{NetnsContext, NetnsGuard, DEFAULT_NETNS_PATH, NETNS_RUN_DIR};
pub use error::{NetnsError, NetnsResult};
pub use nix::sys::socket::{AddressFamily, SockProtocol, SockType};
