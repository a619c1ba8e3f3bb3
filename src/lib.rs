//! # batfish-flow
//!
//! Client side model of the flow records a network analysis backend returns, along with the
//! single line rendering used when printing them.
//!
//! ```rust
//! # use batfish_flow::prelude::*;
//! # use std::convert::TryFrom;
//! let flow = Flow::try_from(serde_json::json!({
//!     "ingressNode": "as2core1",
//!     "ingressInterface": "Ethernet1/0",
//!     "ingressVrf": "default",
//!     "srcIp": "253.127.0.0",
//!     "srcPort": 0,
//!     "dstIp": "2.128.0.101",
//!     "dstPort": 22,
//!     "ipProtocol": "TCP",
//!     "dscp": 0,
//!     "ecn": 0,
//!     "fragmentOffset": 0,
//!     "packetLength": 0,
//!     "state": "NEW",
//!     "tag": "DIFFERENTIAL"
//! }))
//! .expect("Not an object");
//!
//! let line = flow.to_display_string().expect("Incomplete flow");
//! assert!(line.ends_with("flags: n/a"));
//! assert!(!line.contains("DIFFERENTIAL"));
//! ```
#![deny(unused_must_use, unused_imports, bare_trait_objects)]
pub mod config;
mod errors;
mod flow;

pub mod prelude {
    pub use super::config::{Config, TcpFlagMode};
    pub use super::errors::Error;
    pub use super::flow::{fields, Flow, IpProtocol, TcpFlag, TcpFlags, TCP};

    pub use serde_json;
}

pub use errors::Error;
pub use flow::{fields, Flow, IpProtocol, TcpFlag, TcpFlags};
