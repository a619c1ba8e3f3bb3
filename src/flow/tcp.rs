use crate::flow::fields;
use serde::{Deserialize, Serialize};

/// The eight TCP flags carried by a flow, in rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TcpFlag {
    Ack,
    Cwr,
    Ece,
    Fin,
    Psh,
    Rst,
    Syn,
    Urg,
}

impl TcpFlag {
    pub const ALL: [TcpFlag; 8] = [
        TcpFlag::Ack,
        TcpFlag::Cwr,
        TcpFlag::Ece,
        TcpFlag::Fin,
        TcpFlag::Psh,
        TcpFlag::Rst,
        TcpFlag::Syn,
        TcpFlag::Urg,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Ack => fields::TCP_FLAGS_ACK,
            Self::Cwr => fields::TCP_FLAGS_CWR,
            Self::Ece => fields::TCP_FLAGS_ECE,
            Self::Fin => fields::TCP_FLAGS_FIN,
            Self::Psh => fields::TCP_FLAGS_PSH,
            Self::Rst => fields::TCP_FLAGS_RST,
            Self::Syn => fields::TCP_FLAGS_SYN,
            Self::Urg => fields::TCP_FLAGS_URG,
        }
    }

    pub fn from_field_name(name: &str) -> Option<TcpFlag> {
        Self::ALL.iter().copied().find(|f| f.field_name() == name)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TcpFlags {
    pub ack: bool,
    pub cwr: bool,
    pub ece: bool,
    pub fin: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub urg: bool,
}

impl TcpFlags {
    pub(crate) fn from_bits(bits: [u8; 8]) -> Self {
        TcpFlags {
            ack: bits[TcpFlag::Ack.index()] != 0,
            cwr: bits[TcpFlag::Cwr.index()] != 0,
            ece: bits[TcpFlag::Ece.index()] != 0,
            fin: bits[TcpFlag::Fin.index()] != 0,
            psh: bits[TcpFlag::Psh.index()] != 0,
            rst: bits[TcpFlag::Rst.index()] != 0,
            syn: bits[TcpFlag::Syn.index()] != 0,
            urg: bits[TcpFlag::Urg.index()] != 0,
        }
    }

    pub fn is_set(&self, flag: TcpFlag) -> bool {
        match flag {
            TcpFlag::Ack => self.ack,
            TcpFlag::Cwr => self.cwr,
            TcpFlag::Ece => self.ece,
            TcpFlag::Fin => self.fin,
            TcpFlag::Psh => self.psh,
            TcpFlag::Rst => self.rst,
            TcpFlag::Syn => self.syn,
            TcpFlag::Urg => self.urg,
        }
    }
}
