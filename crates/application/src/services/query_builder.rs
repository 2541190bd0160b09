//! DoH Query Builder
//!
//! Translates the `/resolve` query parameters into a DNS query message ready
//! to be relayed upstream.

use ferrous_doh_domain::{check_content_type_param, ClientSubnetOption, DomainError, ResolveParams};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsCode, EdnsOption};
use hickory_proto::rr::{Name, RecordType};
use tracing::{error, info};

/// Advertised UDP payload size of the OPT record we attach.
pub const EDNS_MAX_PAYLOAD: u16 = 4096;

/// Builds DNS query messages from HTTP query parameters
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build a recursive query with a fresh random id, RD and AD set, and the
    /// mandatory Client-Subnet option.
    pub fn build(params: &ResolveParams) -> Result<Message, DomainError> {
        check_content_type_param(params.ct.as_deref()).inspect_err(|e| {
            error!(error = %e, "content type not supported");
        })?;

        let name = Self::parse_name(params.name())?;
        let record_type = Self::parse_type(params.record_type())?;

        let subnet = ClientSubnetOption::parse(params.edns_client_subnet()).inspect_err(|_| {
            error!(
                subnet = params.edns_client_subnet(),
                "question subnet invalid"
            );
        })?;

        info!(
            name = %name,
            qtype = %record_type,
            subnet = %subnet,
            "will query"
        );

        let mut message = Message::new();
        message
            .set_id(fastrand::u16(..))
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_authoritative(false)
            .set_truncated(false)
            .set_recursion_available(false)
            .set_recursion_desired(true)
            .set_authentic_data(true)
            .set_checking_disabled(false);
        message.add_query(Query::query(name, record_type));

        replace_client_subnet(&mut message, &subnet);
        Ok(message)
    }

    /// Canonical form: lower-cased and fully qualified.
    fn parse_name(raw: &str) -> Result<Name, DomainError> {
        if raw.is_empty() {
            error!(name = raw, "question name invalid");
            return Err(DomainError::InvalidQuestionName(raw.to_string()));
        }

        let mut name = Name::from_ascii(raw)
            .map_err(|e| {
                error!(name = raw, error = %e, "question name invalid");
                DomainError::InvalidQuestionName(format!("{}: {}", raw, e))
            })?
            .to_lowercase();
        name.set_fqdn(true);

        Ok(name)
    }

    fn parse_type(raw: &str) -> Result<RecordType, DomainError> {
        raw.parse::<u16>().map(RecordType::from).map_err(|_| {
            error!(qtype = raw, "question type invalid");
            DomainError::InvalidQuestionType(raw.to_string())
        })
    }
}

/// Attach `subnet` as the message's only Client-Subnet option, creating the
/// OPT record if needed.
pub fn replace_client_subnet(message: &mut Message, subnet: &ClientSubnetOption) {
    let edns = message.extensions_mut().get_or_insert_with(|| {
        let mut edns = Edns::new();
        edns.set_max_payload(EDNS_MAX_PAYLOAD);
        edns
    });

    edns.options_mut().remove(EdnsCode::Subnet);
    edns.options_mut()
        .insert(EdnsOption::Subnet(ClientSubnet::new(
            subnet.address(),
            subnet.source_prefix(),
            subnet.scope_prefix(),
        )));
}

/// The Client-Subnet option carried by `message`, if any.
pub fn client_subnet_of(message: &Message) -> Option<&ClientSubnet> {
    match message.extensions().as_ref()?.option(EdnsCode::Subnet)? {
        EdnsOption::Subnet(subnet) => Some(subnet),
        _ => None,
    }
}
