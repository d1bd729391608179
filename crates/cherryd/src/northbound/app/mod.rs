//! Northbound applications shipped with the controller.

pub mod proxyarp;

pub use proxyarp::ProxyArp;
