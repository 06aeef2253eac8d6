use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::IpAddr;
use std::str::FromStr;
use vigil_dns_domain::RecordKind;
use vigil_dns_infrastructure::strategy::wire::{MessageBuilder, ResponseParser};

fn encode(message: &Message) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut encoder = BinEncoder::new(&mut bytes);
    message.emit(&mut encoder).unwrap();
    bytes
}

#[test]
fn built_queries_carry_the_question_and_rd_flag() {
    let bytes = MessageBuilder::build_query("example.com", RecordKind::A).unwrap();
    let message = Message::from_vec(&bytes).unwrap();

    assert_eq!(message.message_type(), MessageType::Query);
    assert!(message.recursion_desired());
    let question = &message.queries()[0];
    assert_eq!(question.query_type(), RecordType::A);
    let mut expected_name = Name::from_str("example.com").unwrap();
    expected_name.set_fqdn(true);
    assert_eq!(question.name(), &expected_name);

    let bytes = MessageBuilder::build_query("example.com", RecordKind::Aaaa).unwrap();
    let message = Message::from_vec(&bytes).unwrap();
    assert_eq!(message.queries()[0].query_type(), RecordType::AAAA);
}

#[test]
fn parser_extracts_both_address_families() {
    let name = Name::from_str("dual.example").unwrap();
    let mut message = Message::new();
    message.set_id(7);
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.add_answer(Record::from_rdata(
        name.clone(),
        60,
        RData::A(A("10.0.0.1".parse().unwrap())),
    ));
    message.add_answer(Record::from_rdata(
        name,
        60,
        RData::AAAA(AAAA("2001:db8::1".parse().unwrap())),
    ));

    let parsed = ResponseParser::parse(&encode(&message)).unwrap();
    assert_eq!(
        parsed.addresses,
        vec![
            "10.0.0.1".parse::<IpAddr>().unwrap(),
            "2001:db8::1".parse::<IpAddr>().unwrap(),
        ]
    );
    assert!(!parsed.is_nodata());
    assert!(!parsed.truncated);
}

#[test]
fn parser_classifies_negative_and_error_responses() {
    let mut message = Message::new();
    message.set_id(7);
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.set_response_code(ResponseCode::NXDomain);
    let parsed = ResponseParser::parse(&encode(&message)).unwrap();
    assert!(parsed.is_nxdomain());

    let mut message = Message::new();
    message.set_id(8);
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.set_response_code(ResponseCode::NoError);
    let parsed = ResponseParser::parse(&encode(&message)).unwrap();
    assert!(parsed.is_nodata());

    let mut message = Message::new();
    message.set_id(9);
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.set_response_code(ResponseCode::ServFail);
    let parsed = ResponseParser::parse(&encode(&message)).unwrap();
    assert!(parsed.is_server_error());
}

#[test]
fn parser_rejects_garbage() {
    assert!(ResponseParser::parse(&[0x00, 0x01, 0x02]).is_err());
}
