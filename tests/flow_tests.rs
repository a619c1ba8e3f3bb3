use batfish_flow::prelude::*;
use serde_json::{json, Map, Value};
use std::convert::TryFrom;

#[derive(Clone, Default)]
struct LogIntercept {
    saw_untyped: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl log::Log for LogIntercept {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let s = record.args().to_string();
        if s.contains("Keeping dstPort=\"ssh\" untyped") {
            self.saw_untyped
                .store(true, std::sync::atomic::Ordering::Relaxed);
        }
    }

    fn flush(&self) {}
}

fn sample() -> Value {
    json!({
        "ingressNode": "as2core1",
        "ingressInterface": "Ethernet1/0",
        "ingressVrf": "default",
        "srcIp": "253.127.0.0",
        "srcPort": 0,
        "dstIp": "2.128.0.101",
        "dstPort": 22,
        "ipProtocol": "TCP",
        "dscp": 0,
        "ecn": 0,
        "fragmentOffset": 0,
        "packetLength": 0,
        "state": "NEW",
        "tag": "DIFFERENTIAL"
    })
}

fn sample_with(key: &str, value: Value) -> Flow {
    let mut v = sample();
    v[key] = value;
    Flow::try_from(v).expect("Failed to build flow")
}

fn sample_without(key: &str) -> Flow {
    let mut map: Map<String, Value> = serde_json::from_value(sample()).expect("Not a map");
    map.remove(key);
    Flow::new(map)
}

fn tcp_flags(ack: u8) -> Flow {
    let mut v = sample();
    v["ipProtocol"] = json!(6);
    for flag in TcpFlag::ALL.iter() {
        v[flag.field_name()] = json!(0);
    }
    v["tcpFlagsAck"] = json!(ack);
    Flow::try_from(v).expect("Failed to build flow")
}

#[test]
fn should_render_sample_flow() {
    let s = Flow::try_from(sample())
        .expect("Failed to build flow")
        .to_display_string()
        .expect("Failed to render");

    assert!(s.contains("as2core1"));
    assert!(s.contains("ingressInterface: Ethernet1/0"));
    assert!(!s.contains("vrf:"));
    assert!(!s.contains("DIFFERENTIAL"));
    assert!(s.contains("flags: n/a"));
}

#[test]
fn should_accept_any_mapping() {
    let empty = Flow::new(Map::new());
    assert!(empty.is_empty());
    assert_eq!(empty.get("ingressNode"), None);

    let odd = Flow::try_from(json!({"": 1, "nested": {"a": [true, null]}, "dscp": -1}))
        .expect("Failed to build flow");
    assert_eq!(odd.len(), 3);
    assert_eq!(odd.get(""), Some(json!(1)));
    assert_eq!(odd.get("nested"), Some(json!({"a": [true, null]})));
    assert_eq!(odd.get("dscp"), Some(json!(-1)));
}

#[test]
fn should_return_every_supplied_value() {
    let mut v = sample();
    v["icmpCode"] = json!(255);
    v["custom"] = json!("kept");
    v["srcPort"] = json!(65536);
    let map: Map<String, Value> = serde_json::from_value(v).expect("Not a map");
    let flow = Flow::new(map.clone());

    for (k, v) in map.iter() {
        assert_eq!(flow.get(k).as_ref(), Some(v), "field {}", k);
    }
    assert_eq!(flow.keys(), map.keys().cloned().collect::<Vec<_>>());
    assert!(!flow.contains("tcpFlagsAck"));
}

#[test]
fn should_omit_missing_interface() {
    let s = sample_without("ingressInterface")
        .to_display_string()
        .expect("Failed to render");
    assert!(!s.contains("ingressInterface:"));
    assert!(s.starts_with("as2core1->["));
}

#[test]
fn should_render_non_default_vrf() {
    let s = sample_with("ingressVrf", json!("mgmt"))
        .to_display_string()
        .expect("Failed to render");
    assert!(s.contains("ingressInterface: Ethernet1/0vrf: mgmt->["));

    let s = sample_without("ingressVrf")
        .to_display_string()
        .expect("Failed to render");
    assert!(!s.contains("vrf:"));
}

#[test]
fn should_never_render_tag() {
    let s = sample_with("tag", json!("ZZ-MARKER-ZZ"))
        .to_display_string()
        .expect("Failed to render");
    assert!(!s.contains("ZZ-MARKER-ZZ"));
}

#[test]
fn should_format_flags() {
    assert_eq!(
        sample_with("ipProtocol", json!(17)).flag_string().unwrap(),
        "n/a"
    );
    assert_eq!(
        tcp_flags(0).flag_string_with(&Config::default()).unwrap(),
        "00000000"
    );
    assert_eq!(
        tcp_flags(1).flag_string_with(&Config::default()).unwrap(),
        "10000000"
    );
    assert_eq!(tcp_flags(1).flag_string_with(&Config::legacy()).unwrap(), "");
}

#[test]
fn should_fail_on_missing_tcp_flag() {
    let flow = sample_with("ipProtocol", json!(6));
    match flow.flag_string() {
        Err(Error::MissingField { field }) => assert_eq!(field, "tcpFlagsAck"),
        other => panic!("Unexpected {:?}", other),
    }
    match flow.tcp_flags() {
        Err(Error::MissingField { field }) => assert_eq!(field, "tcpFlagsAck"),
        other => panic!("Unexpected {:?}", other),
    }
}

#[test]
fn should_fail_on_missing_required_field() {
    for field in vec![
        fields::INGRESS_NODE,
        fields::SRC_IP,
        fields::SRC_PORT,
        fields::DST_IP,
        fields::DST_PORT,
        fields::IP_PROTOCOL,
        fields::DSCP,
        fields::ECN,
        fields::FRAGMENT_OFFSET,
        fields::PACKET_LENGTH,
        fields::STATE,
    ] {
        match sample_without(field).to_display_string() {
            Err(Error::MissingField { field: missing }) => assert_eq!(missing, field),
            other => panic!("Expected {} to be missing, got {:?}", field, other),
        }
    }
}

#[test]
fn should_share_across_threads() {
    let flow = std::sync::Arc::new(tcp_flags(1));
    let expected = flow.to_display_string().expect("Failed to render");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let flow = flow.clone();
            std::thread::spawn(move || flow.to_display_string().expect("Failed to render"))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().expect("Thread panicked"), expected);
    }
}

#[test]
fn should_log_untyped_known_fields() {
    let logger = Box::new(LogIntercept::default());

    log::set_boxed_logger(logger.clone()).unwrap();
    log::set_max_level(log::LevelFilter::Debug);

    let flow = sample_with("dstPort", json!("ssh"));
    assert!(matches!(
        flow.dst_port(),
        Err(Error::InvalidField { field: "dstPort", .. })
    ));
    assert!(flow
        .to_display_string()
        .expect("Failed to render")
        .contains("->2.128.0.101:ssh proto: TCP"));

    assert!(logger
        .saw_untyped
        .load(std::sync::atomic::Ordering::Relaxed));
}

#[test]
fn should_decode_json_text() {
    let flow: Flow = sample().to_string().parse().expect("Failed to parse flow");
    assert_eq!(flow, Flow::try_from(sample()).unwrap());
    assert_eq!(flow.src_ip().unwrap(), "253.127.0.0");
    assert_eq!(flow.tag().unwrap(), "DIFFERENTIAL");

    assert!(matches!("\"flow\"".parse::<Flow>(), Err(Error::NotAnObject)));
}

#[test]
fn should_render_independent_of_environment() {
    let flow = sample_with("ipProtocol", json!(6));
    let mut v = flow.to_map();
    for flag in TcpFlag::ALL.iter() {
        v.insert(flag.field_name().to_owned(), json!(0));
    }
    let flow = Flow::new(v);

    let before = flow.to_display_string().expect("Failed to render");
    let flags_before = flow.flag_string().expect("Failed to format flags");

    std::env::set_var("BATFISH_FLOW_SUPPRESSED_VRF", "mgmt");
    std::env::set_var("BATFISH_FLOW_TCP_FLAGS", "legacy");
    let after = flow.to_display_string();
    let flags_after = flow.flag_string();
    std::env::remove_var("BATFISH_FLOW_SUPPRESSED_VRF");
    std::env::remove_var("BATFISH_FLOW_TCP_FLAGS");

    assert_eq!(after.expect("Failed to render"), before);
    assert_eq!(flags_after.expect("Failed to format flags"), flags_before);
    assert_eq!(flags_before, "00000000");
    assert!(!before.contains("vrf:"));
}
