//! Host Directory
//!
//! Picks hosts from the inventory by group or by name, resolves each
//! hostname to an address and keeps two read-only lookup tables:
//! logical name -> record and address -> record.
//!
//! # Design Notes
//! - A host whose name does not resolve is kept with an empty address. It
//!   shows up in listings but never matches a retrieved record.
//! - Several unresolved hosts share the `""` key in the address table; the
//!   last one wins. This is logged, not hidden.

use crate::config::HostEntry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::{IpAddr, ToSocketAddrs};

/// A selected host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Logical name (inventory key)
    pub name: String,
    /// Configured DNS name
    pub hostname: String,
    pub groups: BTreeSet<String>,
    /// Resolved address, empty when resolution failed
    pub address: String,
}

impl HostRecord {
    pub fn is_resolved(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Which hosts to pick: any listed group OR any listed name
#[derive(Debug, Clone, Default)]
pub struct HostSelection {
    pub groups: Vec<String>,
    pub names: Vec<String>,
}

impl HostSelection {
    pub fn new(groups: Vec<String>, names: Vec<String>) -> Self {
        Self { groups, names }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.names.is_empty()
    }

    /// True when the host belongs to a selected group or is named explicitly
    pub fn matches(&self, name: &str, entry: &HostEntry) -> bool {
        self.names.iter().any(|n| n == name)
            || entry.groups.iter().any(|g| self.groups.contains(g))
    }
}

/// Hostname to address resolution
pub trait Resolve {
    fn resolve(&self, hostname: &str) -> std::io::Result<IpAddr>;
}

/// Resolver backed by the system's standard lookup. IPv4 answers win.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, hostname: &str) -> std::io::Result<IpAddr> {
        let addrs: Vec<IpAddr> = (hostname, 0).to_socket_addrs()?.map(|a| a.ip()).collect();

        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no address for {hostname}"),
                )
            })
    }
}

/// Read-only lookup tables for the selected hosts
#[derive(Debug, Clone, Default)]
pub struct HostDirectory {
    by_name: BTreeMap<String, HostRecord>,
    by_address: HashMap<String, HostRecord>,
}

impl HostDirectory {
    /// Select and resolve hosts from the inventory
    pub fn build<R: Resolve>(
        inventory: &BTreeMap<String, HostEntry>,
        selection: &HostSelection,
        resolver: &R,
    ) -> Self {
        let mut directory = Self::default();

        for (name, entry) in inventory {
            if !selection.matches(name, entry) {
                continue;
            }

            let address = match resolver.resolve(&entry.hostname) {
                Ok(ip) => ip.to_string(),
                Err(e) => {
                    tracing::warn!("Failed to resolve {} ({}): {}", name, entry.hostname, e);
                    String::new()
                }
            };

            let record = HostRecord {
                name: name.clone(),
                hostname: entry.hostname.clone(),
                groups: entry.groups.iter().cloned().collect(),
                address,
            };

            if let Some(previous) = directory
                .by_address
                .insert(record.address.clone(), record.clone())
            {
                tracing::warn!(
                    "Hosts {} and {} share address {:?}; records map to {}",
                    previous.name,
                    record.name,
                    record.address,
                    record.name
                );
            }
            directory.by_name.insert(name.clone(), record);
        }

        for name in &selection.names {
            if !inventory.contains_key(name) {
                tracing::warn!("Host {} is not in the inventory", name);
            }
        }

        tracing::debug!("Selected {} hosts", directory.by_name.len());
        directory
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Selected hosts ordered by logical name
    pub fn records(&self) -> impl Iterator<Item = &HostRecord> {
        self.by_name.values()
    }

    /// Addresses of the selected hosts, including empty ones
    pub fn addresses(&self) -> Vec<String> {
        self.records().map(|r| r.address.clone()).collect()
    }

    pub fn by_name(&self, name: &str) -> Option<&HostRecord> {
        self.by_name.get(name)
    }

    pub fn by_address(&self, address: &str) -> Option<&HostRecord> {
        self.by_address.get(address)
    }

    /// Display name for a record's sender address.
    ///
    /// Unknown addresses fall back to the address itself, and a record
    /// without one to `unknown`.
    pub fn display_name(&self, address: &str) -> String {
        match self.by_address(address) {
            Some(record) if record.is_resolved() => record.name.clone(),
            _ if address.is_empty() => "unknown".to_string(),
            _ => address.to_string(),
        }
    }
}
