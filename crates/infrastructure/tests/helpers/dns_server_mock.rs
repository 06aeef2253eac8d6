use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock answers each query.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// NOERROR with the given A records.
    Answer(Vec<Ipv4Addr>),
    /// NXDOMAIN.
    NxDomain,
    /// NOERROR with an empty answer section.
    Empty,
    /// SERVFAIL.
    ServFail,
    /// Never respond; clients run into their timeout.
    Silent,
}

/// Minimal scripted DNS server for strategy tests. Binds an ephemeral UDP
/// port and answers every query according to its mode.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries_seen: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(mode: MockMode) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries_seen = Arc::new(AtomicUsize::new(0));
        let counter = queries_seen.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { break };
                        counter.fetch_add(1, Ordering::SeqCst);
                        if matches!(mode, MockMode::Silent) {
                            continue;
                        }
                        if let Some(response) = build_response(&buf[..len], &mode) {
                            let _ = socket.send_to(&response, peer).await;
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries_seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> usize {
        self.queries_seen.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn build_response(query_bytes: &[u8], mode: &MockMode) -> Option<Vec<u8>> {
    let query = Message::from_vec(query_bytes).ok()?;
    let question = query.queries().first()?.clone();

    let mut response = Message::new();
    response.set_id(query.id());
    response.set_message_type(MessageType::Response);
    response.set_op_code(OpCode::Query);
    response.set_recursion_desired(true);
    response.set_recursion_available(true);
    response.add_query(question.clone());

    match mode {
        MockMode::Answer(ips) => {
            response.set_response_code(ResponseCode::NoError);
            // Only answer A questions with A records; AAAA gets an empty
            // NOERROR, matching a v4-only zone.
            if question.query_type() == RecordType::A {
                for ip in ips {
                    let mut record =
                        Record::from_rdata(question.name().clone(), 60, RData::A(A(*ip)));
                    record.set_dns_class(DNSClass::IN);
                    response.add_answer(record);
                }
            }
        }
        MockMode::NxDomain => {
            response.set_response_code(ResponseCode::NXDomain);
        }
        MockMode::Empty => {
            response.set_response_code(ResponseCode::NoError);
        }
        MockMode::ServFail => {
            response.set_response_code(ResponseCode::ServFail);
        }
        MockMode::Silent => return None,
    }

    let mut bytes = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut bytes);
    response.emit(&mut encoder).ok()?;
    Some(bytes)
}
