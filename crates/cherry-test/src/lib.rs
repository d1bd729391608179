//! Integration test infrastructure for the Cherry controller
//!
//! Provides:
//! - [`RecordingWriter`]: an in-memory connection that records every outbound
//!   message and can fail or cancel at a chosen write
//! - Fixtures for switch replies, ports and Ethernet/ARP/LLDP frames
//! - Verification helpers over recorded messages

pub mod fixtures;
mod verification;
mod writer;

pub use fixtures::*;
pub use verification::*;
pub use writer::RecordingWriter;
