//! Verification helpers over recorded outbound messages

use cherry_openflow::{FlowMod, Message, PacketOut};
use cherry_protocol::{Arp, Ethernet, PacketError};
use thiserror::Error;

/// Message names the controller sends in reply to HELLO, in order.
pub const HANDSHAKE_ORDER: [&str; 9] = [
    "HELLO",
    "SET_CONFIG",
    "FEATURES_REQUEST",
    "BARRIER_REQUEST",
    "FLOW_MOD",
    "BARRIER_REQUEST",
    "DESCRIPTION_REQUEST",
    "BARRIER_REQUEST",
    "PORT_DESCRIPTION_REQUEST",
];

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected {expected} messages, found {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Message #{index}: expected {expected}, got {actual}")]
    OrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Verify that `messages` start with exactly the handshake sequence.
pub fn verify_handshake_order(messages: &[Message]) -> VerifyResult<()> {
    if messages.len() < HANDSHAKE_ORDER.len() {
        return Err(VerificationError::CountMismatch {
            expected: HANDSHAKE_ORDER.len(),
            actual: messages.len(),
        });
    }
    verify_names(&messages[..HANDSHAKE_ORDER.len()], &HANDSHAKE_ORDER)
}

/// Verify the names of `messages`, one to one.
pub fn verify_names(messages: &[Message], expected: &[&str]) -> VerifyResult<()> {
    if messages.len() != expected.len() {
        return Err(VerificationError::CountMismatch {
            expected: expected.len(),
            actual: messages.len(),
        });
    }
    for (index, (msg, name)) in messages.iter().zip(expected).enumerate() {
        if msg.name() != *name {
            return Err(VerificationError::OrderMismatch {
                index,
                expected: name.to_string(),
                actual: msg.to_string(),
            });
        }
    }
    Ok(())
}

/// Panics unless `messages` start with the handshake sequence.
pub fn assert_handshake_order(messages: &[Message]) {
    if let Err(e) = verify_handshake_order(messages) {
        let names: Vec<_> = messages.iter().map(Message::name).collect();
        panic!("handshake order: {e}\nsent: {names:?}");
    }
}

/// Every PACKET_OUT in `messages`, in order.
pub fn packet_outs(messages: &[Message]) -> Vec<PacketOut> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::PacketOut(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

/// Every FLOW_MOD in `messages`, in order.
pub fn flow_mods(messages: &[Message]) -> Vec<FlowMod> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::FlowMod(f) => Some(f.clone()),
            _ => None,
        })
        .collect()
}

/// Decodes the Ethernet frame and ARP packet carried by a PACKET_OUT.
pub fn decode_arp(packet_out: &PacketOut) -> VerifyResult<(Ethernet, Arp)> {
    let eth = Ethernet::decode(&packet_out.data)?;
    let arp = Arp::decode(&eth.payload)?;
    Ok((eth, arp))
}
