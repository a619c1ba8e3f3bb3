//! Wire names of the fields a flow record knows how to type.

pub const INGRESS_NODE: &str = "ingressNode";
pub const INGRESS_INTERFACE: &str = "ingressInterface";
pub const INGRESS_VRF: &str = "ingressVrf";
pub const SRC_IP: &str = "srcIp";
pub const SRC_PORT: &str = "srcPort";
pub const DST_IP: &str = "dstIp";
pub const DST_PORT: &str = "dstPort";
pub const IP_PROTOCOL: &str = "ipProtocol";
pub const DSCP: &str = "dscp";
pub const ECN: &str = "ecn";
pub const FRAGMENT_OFFSET: &str = "fragmentOffset";
pub const PACKET_LENGTH: &str = "packetLength";
pub const STATE: &str = "state";
pub const TAG: &str = "tag";
pub const ICMP_CODE: &str = "icmpCode";
pub const ICMP_VAR: &str = "icmpVar";

pub const TCP_FLAGS_ACK: &str = "tcpFlagsAck";
pub const TCP_FLAGS_CWR: &str = "tcpFlagsCwr";
pub const TCP_FLAGS_ECE: &str = "tcpFlagsEce";
pub const TCP_FLAGS_FIN: &str = "tcpFlagsFin";
pub const TCP_FLAGS_PSH: &str = "tcpFlagsPsh";
pub const TCP_FLAGS_RST: &str = "tcpFlagsRst";
pub const TCP_FLAGS_SYN: &str = "tcpFlagsSyn";
pub const TCP_FLAGS_URG: &str = "tcpFlagsUrg";

/// Every field with a typed slot on [`Flow`](super::Flow).
pub const ALL: [&str; 24] = [
    INGRESS_NODE,
    INGRESS_INTERFACE,
    INGRESS_VRF,
    SRC_IP,
    SRC_PORT,
    DST_IP,
    DST_PORT,
    IP_PROTOCOL,
    DSCP,
    ECN,
    FRAGMENT_OFFSET,
    PACKET_LENGTH,
    STATE,
    TAG,
    ICMP_CODE,
    ICMP_VAR,
    TCP_FLAGS_ACK,
    TCP_FLAGS_CWR,
    TCP_FLAGS_ECE,
    TCP_FLAGS_FIN,
    TCP_FLAGS_PSH,
    TCP_FLAGS_RST,
    TCP_FLAGS_SYN,
    TCP_FLAGS_URG,
];

pub fn is_known(name: &str) -> bool {
    ALL.contains(&name)
}
