use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::TryFrom;

/// IANA protocol number for TCP.
pub const TCP: u8 = 6;

/// The `ipProtocol` of a flow. Backends report either the protocol number or its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IpProtocol {
    Number(u8),
    Name(String),
}

impl IpProtocol {
    /// Only the numeric form selects the TCP flag branch; names are never interpreted.
    pub fn is_tcp(&self) -> bool {
        matches!(self, IpProtocol::Number(TCP))
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            IpProtocol::Number(n) => Some(*n),
            IpProtocol::Name(_) => None,
        }
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(IpProtocol::Name(s)),
            other => match other.as_u64().and_then(|n| u8::try_from(n).ok()) {
                Some(n) => Ok(IpProtocol::Number(n)),
                None => Err(other),
            },
        }
    }
}

impl From<IpProtocol> for Value {
    fn from(protocol: IpProtocol) -> Self {
        match protocol {
            IpProtocol::Number(n) => Value::from(n),
            IpProtocol::Name(s) => Value::String(s),
        }
    }
}

impl std::fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(s) => write!(f, "{}", s),
        }
    }
}
