use autoptr6_domain::{
    to_reverse_name, ConfigSnapshot, OverrideTable, PtrQuery, QueryType, SubnetMatcher, Transport,
};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use std::net::{Ipv6Addr, SocketAddr};

pub const SUFFIX: &str = "ip6.example.net.";

pub fn client() -> SocketAddr {
    "[2001:db8:ffff::53]:40000".parse().unwrap()
}

pub fn reverse_name(addr: &str) -> String {
    to_reverse_name(addr.parse::<Ipv6Addr>().unwrap())
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(Name::from_ascii(name).unwrap(), record_type));
    message
}

pub fn query_bytes(id: u16, name: &str, record_type: RecordType) -> Vec<u8> {
    query_message(id, name, record_type).to_vec().unwrap()
}

pub fn ptr_bytes(id: u16, addr: &str) -> Vec<u8> {
    query_bytes(id, &reverse_name(addr), RecordType::PTR)
}

pub fn ptr_query(addr: &str) -> PtrQuery {
    PtrQuery::new(reverse_name(addr), QueryType::Ptr, Transport::Udp, client())
}

pub fn snapshot_with(subnets: &[&str], overrides: &[(&str, &str)]) -> ConfigSnapshot {
    let mut table = OverrideTable::new();
    for (addr, target) in overrides {
        table.insert(addr.parse().unwrap(), *target);
    }
    ConfigSnapshot::new(SubnetMatcher::parse(subnets).unwrap(), table, SUFFIX, 3600)
}

pub fn parse_response(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).expect("response should parse")
}

pub fn rcode(bytes: &[u8]) -> ResponseCode {
    parse_response(bytes).response_code()
}

/// PTR targets of every answer record, in order.
pub fn ptr_targets(response: &Message) -> Vec<String> {
    response
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::PTR(ptr) => Some(ptr.0.to_ascii()),
            _ => None,
        })
        .collect()
}
