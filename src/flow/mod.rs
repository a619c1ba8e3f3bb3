pub mod fields;
mod protocol;
mod tcp;

pub use protocol::{IpProtocol, TCP};
pub use tcp::{TcpFlag, TcpFlags};

use crate::config::{Config, TcpFlagMode};
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// A flow record as returned by the analysis backend.
///
/// Holds exactly the keys it was built from. Known fields land in typed slots, anything else
/// (including known fields whose value has an unexpected json type) is kept verbatim in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Flow {
    ingress_node: Option<String>,
    ingress_interface: Option<String>,
    ingress_vrf: Option<String>,
    src_ip: Option<String>,
    src_port: Option<u16>,
    dst_ip: Option<String>,
    dst_port: Option<u16>,
    ip_protocol: Option<IpProtocol>,
    dscp: Option<u8>,
    ecn: Option<u8>,
    fragment_offset: Option<u16>,
    packet_length: Option<u32>,
    state: Option<String>,
    tag: Option<String>,
    icmp_code: Option<u8>,
    icmp_var: Option<u8>,
    tcp_flags: [Option<u8>; 8],
    extra: BTreeMap<String, Value>,
}

/// Borrowed view of a single field, displayed the way the backend wrote it.
#[derive(Clone, Copy, Debug)]
enum FieldRef<'a> {
    Str(&'a str),
    Int(u64),
    Protocol(&'a IpProtocol),
    Raw(&'a Value),
}

impl<'a> FieldRef<'a> {
    fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::from(s),
            Self::Int(n) => Value::from(n),
            Self::Protocol(p) => Value::from(p.clone()),
            Self::Raw(v) => v.clone(),
        }
    }
}

impl<'a> std::fmt::Display for FieldRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Protocol(p) => write!(f, "{}", p),
            Self::Raw(Value::String(s)) => write!(f, "{}", s),
            Self::Raw(v) => write!(f, "{}", v),
        }
    }
}

fn take_str(value: Value) -> Result<String, Value> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(other),
    }
}

fn take_int<T: TryFrom<u64>>(value: Value) -> Result<T, Value> {
    match value.as_u64().and_then(|n| T::try_from(n).ok()) {
        Some(n) => Ok(n),
        None => Err(value),
    }
}

impl Flow {
    /// Adopt every entry of `map`. Never fails.
    pub fn new(map: Map<String, Value>) -> Flow {
        let mut flow = Flow::default();
        for (key, value) in map {
            let adopted = match key.as_str() {
                fields::INGRESS_NODE => take_str(value).map(|v| flow.ingress_node = Some(v)),
                fields::INGRESS_INTERFACE => {
                    take_str(value).map(|v| flow.ingress_interface = Some(v))
                }
                fields::INGRESS_VRF => take_str(value).map(|v| flow.ingress_vrf = Some(v)),
                fields::SRC_IP => take_str(value).map(|v| flow.src_ip = Some(v)),
                fields::SRC_PORT => take_int(value).map(|v| flow.src_port = Some(v)),
                fields::DST_IP => take_str(value).map(|v| flow.dst_ip = Some(v)),
                fields::DST_PORT => take_int(value).map(|v| flow.dst_port = Some(v)),
                fields::IP_PROTOCOL => {
                    IpProtocol::from_value(value).map(|v| flow.ip_protocol = Some(v))
                }
                fields::DSCP => take_int(value).map(|v| flow.dscp = Some(v)),
                fields::ECN => take_int(value).map(|v| flow.ecn = Some(v)),
                fields::FRAGMENT_OFFSET => take_int(value).map(|v| flow.fragment_offset = Some(v)),
                fields::PACKET_LENGTH => take_int(value).map(|v| flow.packet_length = Some(v)),
                fields::STATE => take_str(value).map(|v| flow.state = Some(v)),
                fields::TAG => take_str(value).map(|v| flow.tag = Some(v)),
                fields::ICMP_CODE => take_int(value).map(|v| flow.icmp_code = Some(v)),
                fields::ICMP_VAR => take_int(value).map(|v| flow.icmp_var = Some(v)),
                name => match TcpFlag::from_field_name(name) {
                    Some(flag) => take_int(value).map(|v| flow.tcp_flags[flag.index()] = Some(v)),
                    None => Err(value),
                },
            };
            if let Err(value) = adopted {
                if fields::is_known(&key) {
                    debug!("Keeping {}={} untyped", key, value);
                }
                flow.extra.insert(key, value);
            }
        }
        flow
    }

    fn slot(&self, name: &str) -> Option<FieldRef<'_>> {
        use FieldRef::*;
        match name {
            fields::INGRESS_NODE => self.ingress_node.as_deref().map(Str),
            fields::INGRESS_INTERFACE => self.ingress_interface.as_deref().map(Str),
            fields::INGRESS_VRF => self.ingress_vrf.as_deref().map(Str),
            fields::SRC_IP => self.src_ip.as_deref().map(Str),
            fields::SRC_PORT => self.src_port.map(|v| Int(v.into())),
            fields::DST_IP => self.dst_ip.as_deref().map(Str),
            fields::DST_PORT => self.dst_port.map(|v| Int(v.into())),
            fields::IP_PROTOCOL => self.ip_protocol.as_ref().map(Protocol),
            fields::DSCP => self.dscp.map(|v| Int(v.into())),
            fields::ECN => self.ecn.map(|v| Int(v.into())),
            fields::FRAGMENT_OFFSET => self.fragment_offset.map(|v| Int(v.into())),
            fields::PACKET_LENGTH => self.packet_length.map(|v| Int(v.into())),
            fields::STATE => self.state.as_deref().map(Str),
            fields::TAG => self.tag.as_deref().map(Str),
            fields::ICMP_CODE => self.icmp_code.map(|v| Int(v.into())),
            fields::ICMP_VAR => self.icmp_var.map(|v| Int(v.into())),
            name => TcpFlag::from_field_name(name)
                .and_then(|flag| self.tcp_flags[flag.index()])
                .map(|v| Int(v.into())),
        }
    }

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.slot(name)
            .or_else(|| self.extra.get(name).map(FieldRef::Raw))
    }

    fn display(&self, field: &'static str) -> Result<FieldRef<'_>, Error> {
        self.field(field).ok_or(Error::MissingField { field })
    }

    fn absent(&self, field: &'static str) -> Error {
        match self.extra.get(field) {
            Some(value) => Error::InvalidField {
                field,
                value: value.clone(),
            },
            None => Error::MissingField { field },
        }
    }

    fn required<T>(&self, field: &'static str, slot: Option<T>) -> Result<T, Error> {
        slot.ok_or_else(|| self.absent(field))
    }

    /// The value supplied under `key`, exactly as it was given.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.field(key).map(FieldRef::to_value)
    }

    /// Whether `key` was supplied, whatever its value.
    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Every supplied key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = fields::ALL
            .iter()
            .filter(|name| self.slot(name).is_some())
            .map(|name| name.to_string())
            .chain(self.extra.keys().cloned())
            .collect();
        keys.sort();
        keys
    }

    /// Number of supplied keys.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = fields::ALL
            .iter()
            .filter_map(|name| self.slot(name).map(|v| (name.to_string(), v.to_value())))
            .collect();
        map.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    /// Keys that have no typed slot, plus known keys whose value did not fit one.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn ingress_node(&self) -> Result<&str, Error> {
        self.required(fields::INGRESS_NODE, self.ingress_node.as_deref())
    }

    pub fn ingress_interface(&self) -> Result<&str, Error> {
        self.required(fields::INGRESS_INTERFACE, self.ingress_interface.as_deref())
    }

    pub fn ingress_vrf(&self) -> Result<&str, Error> {
        self.required(fields::INGRESS_VRF, self.ingress_vrf.as_deref())
    }

    pub fn src_ip(&self) -> Result<&str, Error> {
        self.required(fields::SRC_IP, self.src_ip.as_deref())
    }

    pub fn src_port(&self) -> Result<u16, Error> {
        self.required(fields::SRC_PORT, self.src_port)
    }

    pub fn dst_ip(&self) -> Result<&str, Error> {
        self.required(fields::DST_IP, self.dst_ip.as_deref())
    }

    pub fn dst_port(&self) -> Result<u16, Error> {
        self.required(fields::DST_PORT, self.dst_port)
    }

    pub fn ip_protocol(&self) -> Result<&IpProtocol, Error> {
        self.required(fields::IP_PROTOCOL, self.ip_protocol.as_ref())
    }

    pub fn dscp(&self) -> Result<u8, Error> {
        self.required(fields::DSCP, self.dscp)
    }

    pub fn ecn(&self) -> Result<u8, Error> {
        self.required(fields::ECN, self.ecn)
    }

    pub fn fragment_offset(&self) -> Result<u16, Error> {
        self.required(fields::FRAGMENT_OFFSET, self.fragment_offset)
    }

    pub fn packet_length(&self) -> Result<u32, Error> {
        self.required(fields::PACKET_LENGTH, self.packet_length)
    }

    pub fn state(&self) -> Result<&str, Error> {
        self.required(fields::STATE, self.state.as_deref())
    }

    pub fn tag(&self) -> Result<&str, Error> {
        self.required(fields::TAG, self.tag.as_deref())
    }

    pub fn icmp_code(&self) -> Result<u8, Error> {
        self.required(fields::ICMP_CODE, self.icmp_code)
    }

    pub fn icmp_var(&self) -> Result<u8, Error> {
        self.required(fields::ICMP_VAR, self.icmp_var)
    }

    pub fn tcp_flag(&self, flag: TcpFlag) -> Result<u8, Error> {
        self.required(flag.field_name(), self.tcp_flags[flag.index()])
    }

    pub fn tcp_flags(&self) -> Result<TcpFlags, Error> {
        let mut bits = [0u8; 8];
        for flag in TcpFlag::ALL.iter().copied() {
            bits[flag.index()] = self.tcp_flag(flag)?;
        }
        Ok(TcpFlags::from_bits(bits))
    }

    pub fn is_tcp(&self) -> bool {
        self.ip_protocol.as_ref().map_or(false, IpProtocol::is_tcp)
    }

    /// [`Flow::flag_string_with`] with [`Config::new`].
    pub fn flag_string(&self) -> Result<String, Error> {
        self.flag_string_with(&Config::new())
    }

    /// `n/a` unless `ipProtocol` is the number 6, otherwise the eight tcp flags in
    /// `Ack Cwr Ece Fin Psh Rst Syn Urg` order.
    pub fn flag_string_with(&self, config: &Config) -> Result<String, Error> {
        if !self.is_tcp() {
            return Ok(String::from("n/a"));
        }
        let flags = TcpFlag::ALL
            .iter()
            .map(|flag| self.display(flag.field_name()).map(|v| v.to_string()))
            .collect::<Result<String, Error>>()?;
        match config.tcp_flags {
            TcpFlagMode::Composed => Ok(flags),
            TcpFlagMode::Legacy => Ok(String::new()),
        }
    }

    /// [`Flow::render`] with [`Config::new`], independent of the environment.
    pub fn to_display_string(&self) -> Result<String, Error> {
        self.render(&Config::new())
    }

    /// Single line summary of the flow. The tag is never rendered.
    pub fn render(&self, config: &Config) -> Result<String, Error> {
        let iface = match self.field(fields::INGRESS_INTERFACE) {
            Some(iface) => format!("ingressInterface: {}", iface),
            None => String::new(),
        };
        let vrf = match self.field(fields::INGRESS_VRF) {
            Some(FieldRef::Str(vrf)) if vrf == config.suppressed_vrf => String::new(),
            Some(vrf) => format!("vrf: {}", vrf),
            None => String::new(),
        };
        Ok(format!(
            "{node}{iface}{vrf}->[{src_ip}:{src_port}->{dst_ip}:{dst_port} proto: {proto} \
             dscp:{dscp} ecn:{ecn} fragOff:{offset} length:{length} state:{state} flags: {flags}",
            node = self.display(fields::INGRESS_NODE)?,
            iface = iface,
            vrf = vrf,
            src_ip = self.display(fields::SRC_IP)?,
            src_port = self.display(fields::SRC_PORT)?,
            dst_ip = self.display(fields::DST_IP)?,
            dst_port = self.display(fields::DST_PORT)?,
            proto = self.display(fields::IP_PROTOCOL)?,
            dscp = self.display(fields::DSCP)?,
            ecn = self.display(fields::ECN)?,
            offset = self.display(fields::FRAGMENT_OFFSET)?,
            length = self.display(fields::PACKET_LENGTH)?,
            state = self.display(fields::STATE)?,
            flags = self.flag_string_with(config)?,
        ))
    }
}

impl From<Map<String, Value>> for Flow {
    fn from(map: Map<String, Value>) -> Self {
        Flow::new(map)
    }
}

impl From<Flow> for Map<String, Value> {
    fn from(flow: Flow) -> Self {
        flow.to_map()
    }
}

impl TryFrom<Value> for Flow {
    type Error = Error;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Object(map) => Ok(Flow::new(map)),
            _ => Err(Error::NotAnObject),
        }
    }
}

impl TryFrom<&[u8]> for Flow {
    type Error = Error;
    fn try_from(v: &[u8]) -> Result<Self, Self::Error> {
        log::trace!("Deserializing {}", String::from_utf8_lossy(v));
        let value: Value = serde_json::from_slice(v).map_err(|e| {
            let s = String::from_utf8_lossy(v);
            debug!("Failed to deserialize: {}", s);
            Error::from(e)
        })?;
        Flow::try_from(value)
    }
}

impl std::str::FromStr for Flow {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flow::try_from(s.as_bytes())
    }
}
