//! DNS wire codec.
//!
//! Query construction and response parsing are delegated to
//! `hickory-proto`; this module only maps between the crate's types and
//! hickory's message model.

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;
use vigil_dns_domain::{RecordKind, ResolverError};

/// Parsed upstream answer, reduced to what the strategy needs.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub addresses: Vec<IpAddr>,
    pub rcode: ResponseCode,
    pub truncated: bool,
}

impl DnsResponse {
    /// The name exists but carries no records of the requested family.
    pub fn is_nodata(&self) -> bool {
        self.rcode == ResponseCode::NoError && self.addresses.is_empty()
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

/// Builds DNS query messages in wire format.
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a recursive address query and serialize it to wire bytes.
    pub fn build_query(hostname: &str, kind: RecordKind) -> Result<Vec<u8>, ResolverError> {
        let name = Name::from_str(hostname).map_err(|e| {
            ResolverError::InvalidHostname(format!("invalid name '{}': {}", hostname, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type_for(kind));
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message.set_id(fastrand::u16(..));
        message.set_message_type(MessageType::Query);
        message.set_op_code(OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        Self::serialize_message(&message)
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, ResolverError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| ResolverError::MessageEncode(e.to_string()))?;
        Ok(buf)
    }
}

fn record_type_for(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
    }
}

/// Parses upstream responses.
pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, ResolverError> {
        let message = Message::from_vec(response_bytes)
            .map_err(|e| ResolverError::MessageDecode(e.to_string()))?;

        let rcode = message.response_code();
        let truncated = message.truncated();

        let mut addresses = Vec::with_capacity(message.answers().len().min(8));
        for record in message.answers() {
            match record.data() {
                RData::A(a) => addresses.push(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => addresses.push(IpAddr::V6(aaaa.0)),
                _ => {}
            }
        }

        debug!(
            rcode = ?rcode,
            addresses = addresses.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            addresses,
            rcode,
            truncated,
        })
    }
}
