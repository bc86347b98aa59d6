//! DNS-over-HTTPS (RFC 8484) strategy.
//!
//! Queries are encoded with hickory-proto and sent as `GET ?dns=<base64url>`.
//! The strategy carries its own HTTP client whose transport uses the system
//! resolver, so reaching the DoH endpoint never depends on the chain the
//! strategy is part of.

use super::{GaiResolver, Lookup, Name, ResolutionError, ResolverStrategy};
use crate::client::Client;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name as DnsName, RData, RecordType};
use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::Duration,
};
use url::Url;

const DNS_MESSAGE: &str = "application/dns-message";

#[derive(Debug, Clone)]
pub struct DohStrategy {
    endpoint: Url,
    client: Client,
}

impl DohStrategy {
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        let client = Client::builder()
            .resolver(Arc::new(GaiResolver::new()))
            .timeout(timeout)
            .build();
        Self::with_client(endpoint, client)
    }

    /// Use a caller-supplied client for the HTTPS leg.
    pub fn with_client(endpoint: Url, client: Client) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ResolverStrategy for DohStrategy {
    fn label(&self) -> String {
        format!("doh({})", self.endpoint)
    }

    fn lookup<'a>(&'a self, name: &'a Name) -> Lookup<'a> {
        Box::pin(async move {
            tracing::debug!(domain = %name, endpoint = %self.endpoint, "DoH lookup");

            let query = encode_query(name.as_str())?;
            let response = self
                .client
                .get(self.endpoint.as_str())
                .query("dns", &URL_SAFE_NO_PAD.encode(query))
                .header(http::header::ACCEPT, DNS_MESSAGE)
                .send()
                .await?
                .error_for_status()?;

            let body = response.bytes().await?;
            first_a_record(&body).map(IpAddr::V4)
        })
    }
}

/// Wire-format A query for `host`. The id is 0 so responses stay cacheable by
/// HTTP intermediaries.
pub fn encode_query(host: &str) -> Result<Vec<u8>, ResolutionError> {
    let fqdn = if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    };
    let name = DnsName::from_ascii(&fqdn)
        .map_err(|e| ResolutionError::Malformed(format!("invalid hostname {host:?}: {e}")))?;

    let mut message = Message::new();
    message
        .set_id(0)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, RecordType::A));

    message
        .to_vec()
        .map_err(|e| ResolutionError::Malformed(e.to_string()))
}

/// First A record in the answer section of a wire-format response.
pub fn first_a_record(wire: &[u8]) -> Result<Ipv4Addr, ResolutionError> {
    let message = Message::from_vec(wire).map_err(|e| ResolutionError::Malformed(e.to_string()))?;

    if message.response_code() != ResponseCode::NoError {
        return Err(ResolutionError::Lookup(format!(
            "server answered {}",
            message.response_code()
        )));
    }

    message
        .answers()
        .iter()
        .find_map(|record| match record.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .ok_or(ResolutionError::NoAddressRecord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::{A, CNAME};
    use hickory_proto::rr::Record;

    fn response_with(records: Vec<Record>, code: ResponseCode) -> Vec<u8> {
        let mut message = Message::new();
        message
            .set_id(0)
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_response_code(code);
        for record in records {
            message.add_answer(record);
        }
        message.to_vec().unwrap()
    }

    fn name(s: &str) -> DnsName {
        DnsName::from_ascii(s).unwrap()
    }

    #[test]
    fn test_encode_query_roundtrips_question() {
        let wire = encode_query("itch.io").unwrap();
        let message = Message::from_vec(&wire).unwrap();

        assert_eq!(message.id(), 0);
        assert!(message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::A);
        assert_eq!(message.queries()[0].name(), &name("itch.io."));
    }

    #[test]
    fn test_first_a_record_skips_cname() {
        let wire = response_with(
            vec![
                Record::from_rdata(name("www.itch.io."), 60, RData::CNAME(CNAME(name("itch.io.")))),
                Record::from_rdata(name("itch.io."), 60, RData::A(A(Ipv4Addr::new(1, 2, 3, 4)))),
                Record::from_rdata(name("itch.io."), 60, RData::A(A(Ipv4Addr::new(5, 6, 7, 8)))),
            ],
            ResponseCode::NoError,
        );

        assert_eq!(first_a_record(&wire).unwrap(), Ipv4Addr::new(1, 2, 3, 4));
    }

    #[test]
    fn test_no_a_record_is_an_error() {
        let wire = response_with(
            vec![Record::from_rdata(
                name("www.itch.io."),
                60,
                RData::CNAME(CNAME(name("itch.io."))),
            )],
            ResponseCode::NoError,
        );

        assert!(matches!(
            first_a_record(&wire),
            Err(ResolutionError::NoAddressRecord)
        ));
    }

    #[test]
    fn test_nxdomain_is_a_lookup_error() {
        let wire = response_with(vec![], ResponseCode::NXDomain);
        assert!(matches!(first_a_record(&wire), Err(ResolutionError::Lookup(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            first_a_record(&[0xde, 0xad]),
            Err(ResolutionError::Malformed(_))
        ));
    }
}
