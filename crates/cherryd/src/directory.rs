//! Host directory: trusted IP to MAC bindings.

use async_trait::async_trait;
use cherry_protocol::MacAddress;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of trusted host addresses.
///
/// At most one MAC is authoritative for an IP at query time. Implementations
/// are read-only from the controller's point of view and must tolerate
/// concurrent queries.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_mac(&self, ip: Ipv4Addr) -> Result<Option<MacAddress>, DirectoryError>;
}

/// In-memory directory populated from the `[[hosts]]` configuration table.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    hosts: HashMap<Ipv4Addr, MacAddress>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `ip` to `mac`, returning the previous binding.
    pub fn insert(&mut self, ip: Ipv4Addr, mac: MacAddress) -> Option<MacAddress> {
        self.hosts.insert(ip, mac)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl FromIterator<(Ipv4Addr, MacAddress)> for StaticDirectory {
    fn from_iter<I: IntoIterator<Item = (Ipv4Addr, MacAddress)>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn find_mac(&self, ip: Ipv4Addr) -> Result<Option<MacAddress>, DirectoryError> {
        Ok(self.hosts.get(&ip).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        let directory: StaticDirectory = [(Ipv4Addr::new(10, 0, 0, 5), mac)].into_iter().collect();

        assert_eq!(directory.find_mac(Ipv4Addr::new(10, 0, 0, 5)).await.unwrap(), Some(mac));
        assert_eq!(directory.find_mac(Ipv4Addr::new(10, 0, 0, 6)).await.unwrap(), None);
    }

    #[test]
    fn test_insert_replaces_binding() {
        let mut directory = StaticDirectory::new();
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        let first = MacAddress::new([0x02, 0, 0, 0, 0, 1]);
        let second = MacAddress::new([0x02, 0, 0, 0, 0, 2]);

        assert_eq!(directory.insert(ip, first), None);
        assert_eq!(directory.insert(ip, second), Some(first));
        assert_eq!(directory.len(), 1);
    }
}
