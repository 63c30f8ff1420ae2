//! Namespace context and scoped switching
//!
//! `setns(2)` with `CLONE_NEWNET` moves only the calling thread, so each
//! [`NetnsGuard`] is tied to the thread that created it and switches that
//! thread back when dropped.
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


use crate::error::{NetnsError, NetnsResult};
use nix::sched::{setns, CloneFlags};
use nix::sys::socket::{socket, AddressFamily, SockFlag, SockProtocol, SockType};
use rtrkeys_config::NetnsConfig;
use std::fs::File;
use std::marker::PhantomData;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle to the namespace the process started in
pub const DEFAULT_NETNS_PATH: &str = "/proc/self/ns/net";

/// Where `ip netns` keeps named namespaces
pub const NETNS_RUN_DIR: &str = "/var/run/netns";

/// Namespace support for one transport layer.
///
/// Holds the handle of the default namespace and the on/off switch. When
/// support is off, or the default namespace cannot be opened, every
/// operation behaves as if no namespace had been requested.
#[derive(Debug)]
pub struct NetnsContext {
    default_ns: Option<File>,
    active: bool,
    run_dir: PathBuf,
}

impl NetnsContext {
    /// Open the default namespace handle. Support starts deactivated.
    pub fn init() -> Self {
        let default_ns = match File::open(DEFAULT_NETNS_PATH) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(error = %e, "Network namespaces not available");
                None
            }
        };
        Self {
            default_ns,
            active: false,
            run_dir: PathBuf::from(NETNS_RUN_DIR),
        }
    }

    /// Context set up from configuration
    pub fn from_config(config: &NetnsConfig) -> Self {
        let mut context = Self::init();
        if config.enabled {
            context.activate_support();
        }
        context
    }

    /// Look up relative namespace names under `run_dir` instead of
    /// `/var/run/netns`
    pub fn with_run_dir<P: Into<PathBuf>>(mut self, run_dir: P) -> Self {
        self.run_dir = run_dir.into();
        self
    }

    pub fn activate_support(&mut self) {
        self.active = true;
    }

    /// Whether the default namespace handle could be opened
    pub fn is_available(&self) -> bool {
        self.default_ns.is_some()
    }

    /// Whether namespace requests are honoured
    pub fn is_active(&self) -> bool {
        self.active && self.is_available()
    }

    /// Resolve a namespace name to its canonical path.
    ///
    /// Absolute names are used as given, anything else is looked up in the
    /// run directory.
    pub fn resolve_path(&self, name: &str) -> NetnsResult<PathBuf> {
        let candidate = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            self.run_dir.join(name)
        };
        candidate
            .canonicalize()
            .map_err(|_| NetnsError::NotFound(name.to_string()))
    }

    /// Check that sockets can be created for `name`.
    ///
    /// Always succeeds when support is inactive or no name is given.
    pub fn api_usable(&self, name: Option<&str>) -> NetnsResult<()> {
        let Some(name) = name else {
            return Ok(());
        };
        if !self.is_active() {
            return Ok(());
        }
        let path = self.resolve_path(name)?;
        File::open(&path).map_err(|_| NetnsError::NotFound(name.to_string()))?;
        Ok(())
    }

    /// Move the calling thread into namespace `name` until the guard drops.
    ///
    /// With support inactive the guard is a no-op.
    pub fn enter(&self, name: &str) -> NetnsResult<NetnsGuard<'_>> {
        let Some(default_ns) = self.default_ns.as_ref().filter(|_| self.active) else {
            return Ok(NetnsGuard::noop());
        };

        let path = self.resolve_path(name)?;
        let target = File::open(&path).map_err(|_| NetnsError::NotFound(name.to_string()))?;
        setns(&target, CloneFlags::CLONE_NEWNET).map_err(|source| NetnsError::Switch {
            namespace: name.to_string(),
            source,
        })?;

        debug!(namespace = name, "Entered network namespace");
        Ok(NetnsGuard {
            restore_to: Some(default_ns),
            _thread_bound: PhantomData,
        })
    }

    /// Create a socket, inside namespace `name` when one is given and
    /// support is active.
    pub fn create_socket(
        &self,
        domain: AddressFamily,
        ty: SockType,
        protocol: Option<SockProtocol>,
        name: Option<&str>,
    ) -> NetnsResult<OwnedFd> {
        let Some(name) = name.filter(|_| self.is_active()) else {
            return plain_socket(domain, ty, protocol);
        };

        let guard = self.enter(name)?;
        let fd = plain_socket(domain, ty, protocol)?;
        guard.restore()?;

        debug!(namespace = name, "Created socket in network namespace");
        Ok(fd)
    }
}

fn plain_socket(
    domain: AddressFamily,
    ty: SockType,
    protocol: Option<SockProtocol>,
) -> NetnsResult<OwnedFd> {
    socket(domain, ty, SockFlag::SOCK_CLOEXEC, protocol).map_err(NetnsError::Socket)
}

/// Switches the thread back to the default namespace on drop
#[must_use = "dropping the guard immediately leaves the namespace again"]
pub struct NetnsGuard<'a> {
    restore_to: Option<&'a File>,
    // setns is per thread; the guard must not move to another one
    _thread_bound: PhantomData<*const ()>,
}

impl NetnsGuard<'_> {
    fn noop() -> Self {
        Self {
            restore_to: None,
            _thread_bound: PhantomData,
        }
    }

    /// Whether this guard actually switched namespaces
    pub fn is_switched(&self) -> bool {
        self.restore_to.is_some()
    }

    /// Switch back now and report failure instead of logging it
    pub fn restore(mut self) -> NetnsResult<()> {
        match self.restore_to.take() {
            Some(default_ns) => {
                setns(default_ns, CloneFlags::CLONE_NEWNET).map_err(NetnsError::Restore)
            }
            None => Ok(()),
        }
    }
}

impl Drop for NetnsGuard<'_> {
    fn drop(&mut self) {
        if let Some(default_ns) = self.restore_to.take() {
            if let Err(e) = setns(default_ns, CloneFlags::CLONE_NEWNET) {
                warn!(error = %e, "Failed to restore default network namespace");
            }
        }
    }
}
