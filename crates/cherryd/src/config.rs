//! Configuration file support for cherryd
//!
//! Loads and validates the controller configuration from TOML.

use crate::directory::StaticDirectory;
use crate::error::{ControllerError, Result};
use crate::northbound::app::proxyarp::Announcement;
use cherry_protocol::MacAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// OpenFlow session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenflowConfig {
    /// Bytes of an unmatched packet the switch sends to the controller
    #[serde(default = "default_miss_send_len")]
    pub miss_send_len: u16,

    /// TTL advertised in discovery LLDP frames
    #[serde(default = "default_lldp_ttl")]
    pub lldp_ttl_secs: u16,
}

/// Proxy ARP application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyArpConfig {
    /// Address announced when a switch comes up
    #[serde(default)]
    pub announce_ip: Option<Ipv4Addr>,

    #[serde(default)]
    pub announce_mac: Option<MacAddress>,
}

/// A static host directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Complete cherryd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub openflow: OpenflowConfig,

    #[serde(default)]
    pub proxyarp: ProxyArpConfig,

    #[serde(default)]
    pub hosts: Vec<HostEntry>,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_miss_send_len() -> u16 {
    cherry_openflow::OFPCML_NO_BUFFER
}

fn default_lldp_ttl() -> u16 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OpenflowConfig {
    fn default() -> Self {
        Self {
            miss_send_len: default_miss_send_len(),
            lldp_ttl_secs: default_lldp_ttl(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProxyArpConfig {
    /// The configured announcement pair. Call after [`ControllerConfig::validate`].
    pub fn announcement(&self) -> Option<Announcement> {
        match (self.announce_ip, self.announce_mac) {
            (Some(ip), Some(mac)) => Some(Announcement { ip, mac }),
            _ => None,
        }
    }
}

impl ControllerConfig {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ControllerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            ControllerError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match (self.proxyarp.announce_ip, self.proxyarp.announce_mac) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ControllerError::Config(
                    "announce_ip and announce_mac must be set together".to_string(),
                ));
            }
            (Some(_), Some(mac)) if !mac.is_unicast() || mac.is_zero() => {
                return Err(ControllerError::Config(format!(
                    "announce_mac {} must be a unicast address",
                    mac
                )));
            }
            _ => {}
        }

        for host in &self.hosts {
            if !host.mac.is_unicast() || host.mac.is_zero() {
                return Err(ControllerError::Config(format!(
                    "host {} has non-unicast MAC {}",
                    host.ip, host.mac
                )));
            }
        }

        if self.log.level.trim().is_empty() {
            return Err(ControllerError::Config("log level must not be empty".to_string()));
        }

        Ok(())
    }

    /// Builds the static host directory from the `[[hosts]]` entries.
    pub fn directory(&self) -> StaticDirectory {
        self.hosts.iter().map(|h| (h.ip, h.mac)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.openflow.miss_send_len, 0xffff);
        assert_eq!(config.openflow.lldp_ttl_secs, 120);
        assert_eq!(config.log.level, "info");
        assert!(config.proxyarp.announcement().is_none());
        assert!(config.hosts.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[openflow]
lldp_ttl_secs = 30

[proxyarp]
announce_ip = "10.0.0.254"
announce_mac = "00:00:5e:00:53:01"

[[hosts]]
ip = "10.0.0.5"
mac = "aa:bb:cc:dd:ee:ff"

[[hosts]]
ip = "10.0.0.6"
mac = "02:00:00:00:00:06"
"#;
        let config: ControllerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.openflow.lldp_ttl_secs, 30);
        // Unspecified values should use defaults
        assert_eq!(config.openflow.miss_send_len, 0xffff);

        let announcement = config.proxyarp.announcement().unwrap();
        assert_eq!(announcement.ip, Ipv4Addr::new(10, 0, 0, 254));
        assert_eq!(announcement.mac.to_string(), "00:00:5e:00:53:01");
        assert_eq!(config.directory().len(), 2);
    }

    #[test]
    fn test_validate_half_announcement() {
        let mut config = ControllerConfig::default();
        config.proxyarp.announce_ip = Some(Ipv4Addr::new(10, 0, 0, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_multicast_host_mac() {
        let mut config = ControllerConfig::default();
        config.hosts.push(HostEntry {
            ip: Ipv4Addr::new(10, 0, 0, 1),
            mac: MacAddress::BROADCAST,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mac_is_rejected_at_parse() {
        let toml_str = r#"
[[hosts]]
ip = "10.0.0.5"
mac = "not-a-mac"
"#;
        assert!(toml::from_str::<ControllerConfig>(toml_str).is_err());

        let signed = r#"
[[hosts]]
ip = "10.0.0.5"
mac = "+a:bb:cc:dd:ee:ff"
"#;
        assert!(toml::from_str::<ControllerConfig>(signed).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"debug\"").unwrap();

        let config = ControllerConfig::load(file.path()).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ControllerConfig::load("/nonexistent/cherryd.toml").unwrap_err();
        assert!(matches!(err, ControllerError::Config(_)));
    }
}
