//! Proxy ARP.
//!
//! Answers ARP requests on behalf of hosts known to the [`Directory`], so
//! requests never need to be flooded through the network. Announcements are
//! only let through when the directory vouches for the sender binding; any
//! other ARP traffic is dropped.

use crate::directory::Directory;
use crate::error::{ControllerError, Result};
use crate::northbound::{Processor, Propagation};
use async_trait::async_trait;
use cherry_network::{Device, Finder, Port};
use cherry_openflow::{InPort, OutPort};
use cherry_protocol::{Arp, Ethernet, MacAddress, ETHERTYPE_ARP};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info};

/// Address pair the controller announces when a switch comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

pub struct ProxyArp {
    directory: Arc<dyn Directory>,
    announcement: Option<Announcement>,
}

impl ProxyArp {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            directory,
            announcement: None,
        }
    }

    pub fn with_announcement(mut self, announcement: Option<Announcement>) -> Self {
        self.announcement = announcement;
        self
    }

    /// The directory must know `SPA` and bind it to exactly `SHA`.
    async fn is_valid_announcement(&self, arp: &Arp) -> Result<bool> {
        let trusted = self.directory.find_mac(arp.spa).await?;
        Ok(trusted == Some(arp.sha))
    }

    async fn reply(
        &self,
        finder: &dyn Finder,
        ingress: &Port,
        request: &Arp,
        mac: MacAddress,
    ) -> Result<()> {
        let device = finder
            .device(ingress.device_id())
            .ok_or(ControllerError::DeviceNotRegistered(ingress.device_id()))?;

        let reply = Arp::reply(mac, request.tpa, request.sha, request.spa);
        let frame = Ethernet::new(mac, request.sha, ETHERTYPE_ARP, reply.encode());
        send_frame(&device, OutPort::Physical(ingress.number()), frame.encode()).await
    }
}

async fn send_frame(device: &Device, out_port: OutPort, data: Vec<u8>) -> Result<()> {
    let factory = device.factory();
    let mut action = factory.new_action()?;
    action.set_out_port(out_port);

    let mut packet_out = factory.new_packet_out()?;
    packet_out.in_port = InPort::Controller;
    packet_out.action = Some(action);
    packet_out.data = data;

    device.send_message(packet_out).await?;
    Ok(())
}

#[async_trait]
impl Processor for ProxyArp {
    fn name(&self) -> &str {
        "ProxyARP"
    }

    async fn on_packet_in(
        &self,
        finder: &dyn Finder,
        ingress: &Port,
        eth: &Ethernet,
    ) -> Result<Propagation> {
        if !eth.is_arp() {
            return Ok(Propagation::Continue);
        }
        debug!(ingress = %ingress, "received ARP packet");

        let arp = Arp::decode(&eth.payload)?;
        if !arp.is_request() {
            debug!(
                ingress = %ingress,
                operation = arp.operation.code(),
                "dropping non-request ARP packet"
            );
            return Ok(Propagation::Stop);
        }

        if arp.is_announcement() {
            if !self.is_valid_announcement(&arp).await? {
                info!(
                    ingress = %ingress,
                    src = %eth.src,
                    dst = %eth.dst,
                    ip = %arp.spa,
                    "dropping suspicious ARP announcement"
                );
                return Ok(Propagation::Stop);
            }
            debug!(ingress = %ingress, ip = %arp.spa, "passing valid ARP announcement");
            return Ok(Propagation::Continue);
        }

        let Some(mac) = self.directory.find_mac(arp.tpa).await? else {
            debug!(ip = %arp.tpa, "dropping ARP request for unknown host");
            return Ok(Propagation::Stop);
        };

        debug!(ip = %arp.tpa, mac = %mac, ingress = %ingress, "sending ARP reply");
        self.reply(finder, ingress, &arp, mac).await?;
        Ok(Propagation::Stop)
    }

    async fn on_device_up(
        &self,
        _finder: &dyn Finder,
        device: &Arc<Device>,
    ) -> Result<Propagation> {
        if let Some(Announcement { ip, mac }) = self.announcement {
            let announcement = Arp::announcement(mac, ip);
            let frame = Ethernet::new(
                mac,
                MacAddress::BROADCAST,
                ETHERTYPE_ARP,
                announcement.encode(),
            );
            send_frame(device, OutPort::Flood, frame.encode()).await?;
            debug!(device = %device.id(), ip = %ip, mac = %mac, "flooded ARP announcement");
        }
        Ok(Propagation::Continue)
    }
}
