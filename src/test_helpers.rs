//! Shared test helpers: DNS message fixtures, a loopback fake resolver and a
//! loopback fake HTTP server.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::dns::{DnsHeader, RecordType};

#[path = "../tests/support/fake_http.rs"]
mod fake_http;

pub(crate) use fake_http::{http_response, FakeHttpServer};

/// Compression pointer to offset 12, where the question name starts.
pub(crate) const NAME_POINTER: [u8; 2] = [0xc0, 0x0c];

pub(crate) fn encode_name(domain: &str) -> Vec<u8> {
    let mut name = Vec::new();
    for label in domain.split('.') {
        name.push(label.len() as u8);
        name.extend_from_slice(label.as_bytes());
    }
    name.push(0);
    name
}

pub(crate) fn question_section(domain: &str, qtype: u16) -> Vec<u8> {
    let mut question = encode_name(domain);
    question.extend_from_slice(&qtype.to_be_bytes());
    question.extend_from_slice(&1u16.to_be_bytes());
    question
}

pub(crate) fn answer_record(name: &[u8], rtype: u16, rdata: &[u8]) -> Vec<u8> {
    let mut record = name.to_vec();
    record.extend_from_slice(&rtype.to_be_bytes());
    record.extend_from_slice(&1u16.to_be_bytes());
    record.extend_from_slice(&300u32.to_be_bytes());
    record.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    record.extend_from_slice(rdata);
    record
}

pub(crate) fn address_rdata(ip: IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

pub(crate) fn response_message(id: u16, rcode: u8, question: &[u8], answers: &[Vec<u8>]) -> Vec<u8> {
    let header = DnsHeader {
        id,
        flags: 0x8180 | rcode as u16,
        question_count: 1,
        answer_count: answers.len() as u16,
        ..Default::default()
    };
    let mut message = Vec::new();
    header.pack(&mut message);
    message.extend_from_slice(question);
    for answer in answers {
        message.extend_from_slice(answer);
    }
    message
}

/// How the fake resolver answers one query.
#[derive(Debug, Clone)]
pub(crate) enum DnsReply {
    Address(IpAddr),
    NoRecords,
    ServerFailure,
    WrongId,
    Silent,
}

type ReplyFn = dyn Fn(&str, RecordType) -> (Duration, DnsReply) + Send + Sync;

/// A UDP DNS server on loopback answering from a closure.
pub(crate) struct FakeDnsServer {
    pub addr: SocketAddr,
    queries: Arc<Mutex<Vec<(String, u16)>>>,
}

impl FakeDnsServer {
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&str, RecordType) -> (Duration, DnsReply) + Send + Sync + 'static,
    {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(Mutex::new(Vec::new()));
        let reply: Arc<ReplyFn> = Arc::new(reply);

        let recorded = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buffer = [0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buffer).await else {
                    break;
                };
                let packet = buffer[..len].to_vec();
                let id = u16::from_be_bytes([packet[0], packet[1]]);
                let (domain, name_end) = read_name(&packet, 12);
                let qtype = u16::from_be_bytes([packet[name_end], packet[name_end + 1]]);
                let question = packet[12..name_end + 4].to_vec();
                recorded.lock().unwrap().push((domain.clone(), qtype));

                let record_type = if qtype == RecordType::Aaaa.code() {
                    RecordType::Aaaa
                } else {
                    RecordType::A
                };
                let (delay, action) = reply(&domain, record_type);
                let socket = Arc::clone(&socket);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let message = match action {
                        DnsReply::Address(ip) => response_message(
                            id,
                            0,
                            &question,
                            &[answer_record(&NAME_POINTER, qtype, &address_rdata(ip))],
                        ),
                        DnsReply::NoRecords => response_message(id, 0, &question, &[]),
                        DnsReply::ServerFailure => response_message(id, 2, &question, &[]),
                        DnsReply::WrongId => {
                            response_message(id.wrapping_add(1), 0, &question, &[])
                        }
                        DnsReply::Silent => return,
                    };
                    let _ = socket.send_to(&message, peer).await;
                });
            }
        });

        Self { addr, queries }
    }

    /// Domains and query types received so far.
    pub fn queries(&self) -> Vec<(String, u16)> {
        self.queries.lock().unwrap().clone()
    }
}

fn read_name(packet: &[u8], mut offset: usize) -> (String, usize) {
    let mut labels = Vec::new();
    loop {
        let len = packet[offset] as usize;
        offset += 1;
        if len == 0 {
            break;
        }
        labels.push(String::from_utf8_lossy(&packet[offset..offset + len]).to_string());
        offset += len;
    }
    (labels.join("."), offset)
}
