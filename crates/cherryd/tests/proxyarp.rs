//! Proxy ARP integration tests
//!
//! Frames enter through a connected session; the pipeline is proxy ARP
//! followed by a recorder that shows whether the event got past it.

mod common;

use async_trait::async_trait;
use cherry_network::Finder;
use cherry_openflow::{InPort, Incoming, OutPort};
use cherry_protocol::{ArpOperation, MacAddress};
use cherry_test::desc;
use cherryd::northbound::app::ProxyArp;
use cherryd::{
    ControllerConfig, ControllerError, Directory, DirectoryError, Pipeline, Session,
    StaticDirectory,
};
use common::{EventLog, Recorder};
use pretty_assertions::assert_eq;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::mpsc;

const DATAPATH_ID: u64 = 0x10;
const KNOWN_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);
const REQUESTER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

fn known_mac() -> MacAddress {
    "aa:bb:cc:dd:ee:ff".parse().unwrap()
}

fn requester_mac() -> MacAddress {
    "02:00:00:00:00:01".parse().unwrap()
}

/// A directory whose backing store is down.
struct UnavailableDirectory;

#[async_trait]
impl Directory for UnavailableDirectory {
    async fn find_mac(&self, _ip: Ipv4Addr) -> Result<Option<MacAddress>, DirectoryError> {
        Err(DirectoryError::Unavailable("db down".to_string()))
    }
}

struct Harness {
    session: Session,
    writer: Arc<cherry_test::RecordingWriter>,
    log: EventLog,
}

impl Harness {
    async fn new() -> Self {
        let directory: StaticDirectory = [(KNOWN_IP, known_mac())].into_iter().collect();
        Self::with_directory(Arc::new(directory)).await
    }

    async fn with_directory(directory: Arc<dyn Directory>) -> Self {
        let log = common::event_log();
        let pipeline = Pipeline::new()
            .with(ProxyArp::new(directory))
            .with(Recorder::new("next", log.clone()));
        let controller = common::controller(pipeline);
        let (mut session, writer) = common::open(&controller);
        common::connect(
            &mut session,
            &writer,
            DATAPATH_ID,
            desc::generic(),
            common::up_ports(),
        )
        .await;
        log.lock().clear();
        Self { session, writer, log }
    }

    async fn receive(&mut self, in_port: u32, frame: Vec<u8>) {
        self.session
            .handle(Incoming::PacketIn(cherry_test::packet_in(in_port, frame)))
            .await
            .unwrap();
    }

    fn reached_next(&self) -> bool {
        !self.log.lock().is_empty()
    }
}

#[tokio::test]
async fn test_request_for_known_host_is_answered() {
    let mut h = Harness::new().await;

    h.receive(3, cherry_test::arp_request_frame(requester_mac(), REQUESTER_IP, KNOWN_IP))
        .await;

    let outs = cherry_test::packet_outs(&h.writer.messages());
    assert_eq!(outs.len(), 1);
    let out = &outs[0];
    assert_eq!(out.in_port, InPort::Controller);
    assert_eq!(out.action.as_ref().and_then(|a| a.out_port()), Some(OutPort::Physical(3)));

    let (eth, arp) = cherry_test::decode_arp(out).unwrap();
    assert_eq!(eth.src, known_mac());
    assert_eq!(eth.dst, requester_mac());
    assert_eq!(arp.operation, ArpOperation::Reply);
    assert_eq!(arp.sha, known_mac());
    assert_eq!(arp.spa, KNOWN_IP);
    assert_eq!(arp.tha, requester_mac());
    assert_eq!(arp.tpa, REQUESTER_IP);

    assert!(!h.reached_next());
}

#[tokio::test]
async fn test_request_for_unknown_host_is_dropped() {
    let mut h = Harness::new().await;

    h.receive(
        3,
        cherry_test::arp_request_frame(requester_mac(), REQUESTER_IP, Ipv4Addr::new(10, 0, 0, 99)),
    )
    .await;

    assert!(h.writer.is_empty());
    assert!(!h.reached_next());
}

#[tokio::test]
async fn test_trusted_announcement_passes() {
    let mut h = Harness::new().await;

    h.receive(2, cherry_test::arp_announcement_frame(known_mac(), KNOWN_IP))
        .await;

    assert!(h.writer.is_empty());
    assert_eq!(
        *h.log.lock(),
        vec!["next:packet_in 0000000000000010/2 0806".to_string()]
    );
}

#[tokio::test]
async fn test_spoofed_announcement_is_dropped() {
    let mut h = Harness::new().await;
    let spoofer: MacAddress = "02:00:00:00:00:66".parse().unwrap();

    h.receive(2, cherry_test::arp_announcement_frame(spoofer, KNOWN_IP))
        .await;
    // Unknown address: nothing to vouch for it either.
    h.receive(2, cherry_test::arp_announcement_frame(spoofer, Ipv4Addr::new(10, 0, 0, 66)))
        .await;

    assert!(h.writer.is_empty());
    assert!(!h.reached_next());
}

#[tokio::test]
async fn test_non_arp_traffic_continues() {
    let mut h = Harness::new().await;

    h.receive(4, cherry_test::ipv4_frame(requester_mac(), known_mac()))
        .await;

    assert!(h.writer.is_empty());
    assert_eq!(
        *h.log.lock(),
        vec!["next:packet_in 0000000000000010/4 0800".to_string()]
    );
}

#[tokio::test]
async fn test_directory_failure_is_an_application_error() {
    let mut h = Harness::with_directory(Arc::new(UnavailableDirectory)).await;
    let request = cherry_test::arp_request_frame(requester_mac(), REQUESTER_IP, KNOWN_IP);

    let err = h
        .session
        .handle(Incoming::PacketIn(cherry_test::packet_in(3, request)))
        .await
        .unwrap_err();

    match &err {
        ControllerError::Application { name, source } => {
            assert_eq!(name, "ProxyARP");
            assert!(matches!(**source, ControllerError::Directory(_)));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "ProxyARP: host directory lookup failed: directory unavailable: db down"
    );
    assert!(!err.is_fatal());
    assert!(!h.reached_next());
    assert!(h.writer.is_empty());
}

#[tokio::test]
async fn test_directory_failure_does_not_end_session() {
    let h = Harness::with_directory(Arc::new(UnavailableDirectory)).await;
    let request = cherry_test::arp_request_frame(requester_mac(), REQUESTER_IP, KNOWN_IP);
    let ipv4 = cherry_test::ipv4_frame(requester_mac(), known_mac());

    let (tx, rx) = mpsc::channel(4);
    tx.send(Incoming::PacketIn(cherry_test::packet_in(3, request)))
        .await
        .unwrap();
    tx.send(Incoming::PacketIn(cherry_test::packet_in(4, ipv4)))
        .await
        .unwrap();
    drop(tx);

    h.session.run(rx).await.unwrap();

    // Only the frame after the failed lookup got past proxy ARP.
    assert_eq!(
        h.log.lock()[0],
        "next:packet_in 0000000000000010/4 0800".to_string()
    );
    assert!(!h.log.lock().iter().any(|e| e.contains("0806")));
    assert!(h.writer.is_empty());
}

#[tokio::test]
async fn test_configured_announcement_is_flooded_on_device_up() {
    let config: ControllerConfig = toml::from_str(
        r#"
[proxyarp]
announce_ip = "10.0.0.254"
announce_mac = "00:00:5e:00:53:01"

[[hosts]]
ip = "10.0.0.5"
mac = "aa:bb:cc:dd:ee:ff"
"#,
    )
    .unwrap();
    config.validate().unwrap();

    let pipeline = Pipeline::new().with(
        ProxyArp::new(Arc::new(config.directory()))
            .with_announcement(config.proxyarp.announcement()),
    );
    let controller = common::controller(pipeline);
    let (mut session, writer) = common::open(&controller);
    for msg in [
        Incoming::FeaturesReply(cherry_test::features_reply(DATAPATH_ID)),
        Incoming::DescReply(desc::generic()),
    ] {
        session.handle(msg).await.unwrap();
    }
    writer.clear();
    session
        .handle(Incoming::PortDescReply(cherry_test::port_desc_reply(common::up_ports())))
        .await
        .unwrap();

    let floods: Vec<_> = cherry_test::packet_outs(&writer.messages())
        .into_iter()
        .filter(|p| p.action.as_ref().and_then(|a| a.out_port()) == Some(OutPort::Flood))
        .collect();
    assert_eq!(floods.len(), 1);

    let (eth, arp) = cherry_test::decode_arp(&floods[0]).unwrap();
    assert!(eth.dst.is_broadcast());
    assert!(arp.is_announcement());
    assert_eq!(arp.spa, Ipv4Addr::new(10, 0, 0, 254));
    assert_eq!(arp.sha.to_string(), "00:00:5e:00:53:01");
    assert!(controller.topology().device(cherry_network::DeviceId::new(DATAPATH_ID)).is_some());
}
