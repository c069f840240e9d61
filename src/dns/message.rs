//! DNS wire format (RFC 1035), restricted to A/AAAA queries of class IN.
//!
//! Queries carry one question with recursion desired. Responses are validated
//! (transaction id, response code, answer count) and the answer section is
//! walked record by record until one of the requested type is found.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::config::{DNS_CLASS_IN, DNS_FLAG_RECURSION_DESIRED, DNS_HEADER_LEN};
use crate::error_handling::{DnsProtocolError, FetchError};

/// Address record types the resolver asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 address record.
    A = 1,
    /// IPv6 address record.
    Aaaa = 28,
}

impl RecordType {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Length of the record data holding one address.
    pub fn address_len(self) -> usize {
        match self {
            RecordType::A => 4,
            RecordType::Aaaa => 16,
        }
    }

    /// Human name of the address family, used in log lines.
    pub fn family(self) -> &'static str {
        match self {
            RecordType::A => "IPv4",
            RecordType::Aaaa => "IPv6",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// The fixed 12-byte DNS message header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl DnsHeader {
    /// Header for a single-question recursive query.
    pub fn query(id: u16) -> Self {
        Self {
            id,
            flags: DNS_FLAG_RECURSION_DESIRED,
            question_count: 1,
            ..Default::default()
        }
    }

    pub fn pack(&self, buffer: &mut Vec<u8>) {
        for field in [
            self.id,
            self.flags,
            self.question_count,
            self.answer_count,
            self.authority_count,
            self.additional_count,
        ] {
            buffer.extend_from_slice(&field.to_be_bytes());
        }
    }

    pub fn unpack(buffer: &[u8]) -> Result<Self, DnsProtocolError> {
        if buffer.len() < DNS_HEADER_LEN {
            return Err(DnsProtocolError::MalformedMessage(format!(
                "{} bytes is shorter than a header",
                buffer.len()
            )));
        }
        let field = |i: usize| u16::from_be_bytes([buffer[i], buffer[i + 1]]);
        Ok(Self {
            id: field(0),
            flags: field(2),
            question_count: field(4),
            answer_count: field(6),
            authority_count: field(8),
            additional_count: field(10),
        })
    }

    /// The RCODE nibble of the flags field.
    pub fn response_code(&self) -> u8 {
        (self.flags & 0x000f) as u8
    }
}

/// Appends `domain` as length-prefixed labels ending in a zero-length label.
///
/// Empty labels (a trailing dot) are skipped.
pub fn encode_domain_name(domain: &str, buffer: &mut Vec<u8>) -> Result<(), FetchError> {
    for label in domain.split('.').filter(|label| !label.is_empty()) {
        if label.len() > 63 || !label.is_ascii() {
            return Err(FetchError::InvalidUrl(format!(
                "host label {label:?} cannot be encoded in a DNS query"
            )));
        }
        buffer.push(label.len() as u8);
        buffer.extend_from_slice(label.as_bytes());
    }
    buffer.push(0);
    Ok(())
}

/// Builds a complete query message for `domain`.
pub fn build_query(id: u16, domain: &str, record_type: RecordType) -> Result<Vec<u8>, FetchError> {
    let mut buffer = Vec::with_capacity(DNS_HEADER_LEN + domain.len() + 6);
    DnsHeader::query(id).pack(&mut buffer);
    encode_domain_name(domain, &mut buffer)?;
    buffer.extend_from_slice(&record_type.code().to_be_bytes());
    buffer.extend_from_slice(&DNS_CLASS_IN.to_be_bytes());
    Ok(buffer)
}

/// Returns the offset just past the name starting at `offset`.
///
/// A name is a run of literal labels terminated either by a zero byte or by a
/// compression pointer (top two bits `11`, two bytes). The pointer target is
/// never followed because only the name's length matters here.
fn skip_name(buffer: &[u8], mut offset: usize) -> Option<usize> {
    loop {
        let indicator = *buffer.get(offset)?;
        if indicator >> 6 == 0b11 {
            buffer.get(offset + 1)?;
            return Some(offset + 2);
        }
        if indicator == 0 {
            return Some(offset + 1);
        }
        offset += 1 + indicator as usize;
    }
}

fn read_u16(buffer: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_be_bytes([
        *buffer.get(offset)?,
        *buffer.get(offset + 1)?,
    ]))
}

/// Validates a response to the query `query_id` and extracts the first address
/// of type `record_type`.
///
/// Checks, in order: transaction id, response code, answer count. Answers of
/// other types are skipped by their declared data length.
pub fn parse_response(
    buffer: &[u8],
    query_id: u16,
    record_type: RecordType,
) -> Result<IpAddr, DnsProtocolError> {
    let header = DnsHeader::unpack(buffer)?;
    if header.id != query_id {
        return Err(DnsProtocolError::SpoofedOrMismatchedResponse {
            sent: query_id,
            received: header.id,
        });
    }
    if header.response_code() != 0 {
        return Err(DnsProtocolError::ServerResolutionFailure(
            header.response_code(),
        ));
    }
    let missing = DnsProtocolError::NoSuchAddressRecord(record_type);
    if header.answer_count == 0 {
        return Err(missing);
    }

    let mut offset = DNS_HEADER_LEN;
    for _ in 0..header.question_count {
        offset = skip_name(buffer, offset).ok_or_else(|| missing.clone())? + 4;
    }

    for _ in 0..header.answer_count {
        offset = skip_name(buffer, offset).ok_or_else(|| missing.clone())?;
        // type(2) class(2) ttl(4) rdlength(2)
        let answer_type = read_u16(buffer, offset).ok_or_else(|| missing.clone())?;
        let data_len = read_u16(buffer, offset + 8).ok_or_else(|| missing.clone())? as usize;
        let data_start = offset + 10;
        let data = buffer
            .get(data_start..data_start + data_len)
            .ok_or_else(|| missing.clone())?;

        if answer_type == record_type.code() {
            return address_from_rdata(data, record_type).ok_or(missing);
        }
        offset = data_start + data_len;
    }
    Err(missing)
}

fn address_from_rdata(data: &[u8], record_type: RecordType) -> Option<IpAddr> {
    if data.len() != record_type.address_len() {
        return None;
    }
    match record_type {
        RecordType::A => {
            let octets: [u8; 4] = data.get(..4)?.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        RecordType::Aaaa => {
            let octets: [u8; 16] = data.get(..16)?.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
    }
}
