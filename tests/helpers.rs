// Shared helpers for integration tests: a loopback DNS resolver and a
// loopback HTTP server, both recording what they receive.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;

use wireget::dns::DnsHeader;
use wireget::{Config, Fetcher, RecordType};

#[path = "support/fake_http.rs"]
mod fake_http;

pub use fake_http::{http_response, FakeHttpServer};

/// Answers every A query with 127.0.0.1 and every AAAA query with no records.
pub struct FakeDns {
    pub addr: SocketAddr,
    queries: Arc<Mutex<Vec<(String, u16)>>>,
}

impl FakeDns {
    pub async fn start() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buffer = [0u8; 512];
            while let Ok((len, peer)) = socket.recv_from(&mut buffer).await {
                let packet = &buffer[..len];
                let query = DnsHeader::unpack(packet).unwrap();
                let (name, name_end) = read_name(packet);
                let qtype = u16::from_be_bytes([packet[name_end], packet[name_end + 1]]);
                recorded.lock().unwrap().push((name, qtype));

                let is_a = qtype == RecordType::A.code();
                let header = DnsHeader {
                    id: query.id,
                    flags: 0x8180,
                    question_count: 1,
                    answer_count: u16::from(is_a),
                    ..Default::default()
                };
                let mut reply = Vec::new();
                header.pack(&mut reply);
                reply.extend_from_slice(&packet[12..name_end + 4]);
                if is_a {
                    reply.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4]);
                    reply.extend_from_slice(&Ipv4Addr::LOCALHOST.octets());
                }
                let _ = socket.send_to(&reply, peer).await;
            }
        });

        Self { addr, queries }
    }

    /// Queried names with their query type codes.
    pub fn queries(&self) -> Vec<(String, u16)> {
        self.queries.lock().unwrap().clone()
    }
}

fn read_name(packet: &[u8]) -> (String, usize) {
    let mut labels = Vec::new();
    let mut offset = 12;
    while packet[offset] != 0 {
        let len = packet[offset] as usize;
        labels.push(String::from_utf8_lossy(&packet[offset + 1..offset + 1 + len]).into_owned());
        offset += 1 + len;
    }
    (labels.join("."), offset + 1)
}

/// Returns the value of `name` in a raw request, if present.
#[allow(dead_code)] // Used by other test files
pub fn request_header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
    request
        .split("\r\n")
        .skip(1)
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(": "))
}

/// A fetcher wired to `dns` with short timeouts.
pub fn create_test_fetcher(dns: &FakeDns, range_threshold: u64) -> Fetcher {
    let config = Config {
        resolver: dns.addr,
        dns_timeout_secs: 2,
        http_timeout_secs: 2,
        range_threshold,
        ..Default::default()
    };
    Fetcher::new(&config).unwrap()
}
