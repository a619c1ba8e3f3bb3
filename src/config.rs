use log::warn;
use serde::{Deserialize, Serialize};

/// What the TCP branch of flag formatting yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TcpFlagMode {
    /// Eight digits, one per flag, in `Ack Cwr Ece Fin Psh Rst Syn Urg` order.
    Composed,
    /// Historical behavior: the flags are read but nothing is returned, rendering as an empty segment.
    Legacy,
}

impl Default for TcpFlagMode {
    fn default() -> Self {
        Self::Composed
    }
}

impl std::str::FromStr for TcpFlagMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composed" => Ok(Self::Composed),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("Unknown tcp flag mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for TcpFlagMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Composed => write!(f, "composed"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Rendering options for flow records
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Vrf omitted from rendered flows, defaults to "default", [`Config::from_env`] reads it from
    /// BATFISH_FLOW_SUPPRESSED_VRF
    pub suppressed_vrf: String,
    /// Behavior of the tcp flag segment, defaults to composed, [`Config::from_env`] reads it from
    /// BATFISH_FLOW_TCP_FLAGS
    pub tcp_flags: TcpFlagMode,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Suppresses the "default" vrf and composes tcp flags. Reads nothing from the environment.
    pub fn new() -> Self {
        Config {
            suppressed_vrf: String::from("default"),
            tcp_flags: TcpFlagMode::Composed,
        }
    }

    /// Same as [`Config::new`] with the historical empty tcp flag segment.
    pub fn legacy() -> Self {
        Config {
            tcp_flags: TcpFlagMode::Legacy,
            ..Config::new()
        }
    }

    /// [`Config::new`] with overrides from BATFISH_FLOW_SUPPRESSED_VRF and BATFISH_FLOW_TCP_FLAGS.
    /// An unparsable tcp flag mode is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Config::new();
        if let Ok(s) = std::env::var("BATFISH_FLOW_SUPPRESSED_VRF") {
            config.suppressed_vrf = s;
        }
        if let Ok(s) = std::env::var("BATFISH_FLOW_TCP_FLAGS") {
            match s.parse::<TcpFlagMode>() {
                Ok(mode) => config.tcp_flags = mode,
                Err(e) => warn!("{}, using {}", e, config.tcp_flags),
            }
        }
        config
    }
}
