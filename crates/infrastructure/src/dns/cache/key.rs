use compact_str::CompactString;
use ferrous_doh_application::services::query_builder::client_subnet_of;
use hickory_proto::op::Message;
use std::fmt::Write;

/// Identifier-agnostic cache key: question name, type and Client-Subnet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: CompactString,
    pub record_type: u16,
    pub subnet: Option<CompactString>,
}

impl CacheKey {
    #[inline]
    pub fn new(name: &str, record_type: u16, subnet: Option<&str>) -> Self {
        Self {
            name: CompactString::from(name.to_ascii_lowercase()),
            record_type,
            subnet: subnet.map(CompactString::from),
        }
    }

    /// `None` when the message has no question section.
    pub fn from_message(message: &Message) -> Option<Self> {
        let question = message.queries().first()?;

        let mut name = question.name().to_lowercase();
        name.set_fqdn(true);

        let subnet = client_subnet_of(message).map(|subnet| {
            let mut encoded = CompactString::default();
            let _ = write!(encoded, "{}/{}", subnet.addr(), subnet.source_prefix());
            encoded
        });

        Some(Self {
            name: CompactString::from(name.to_ascii()),
            record_type: u16::from(question.query_type()),
            subnet,
        })
    }
}
