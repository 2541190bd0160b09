use crate::DomainError;

/// The one DoH media type this proxy produces.
pub const DOH_CONTENT_TYPE: &str = "application/dns-message";

const WILDCARD: &str = "*/*";

/// Checks an `Accept` header value. A missing or empty header accepts anything.
pub fn accepts_doh(accept: Option<&str>) -> bool {
    match accept {
        None => true,
        Some(value) => value.is_empty() || value == WILDCARD || value == DOH_CONTENT_TYPE,
    }
}

/// Checks the `ct` query parameter, which may only name the DoH media type.
pub fn check_content_type_param(ct: Option<&str>) -> Result<(), DomainError> {
    match ct {
        None | Some("") | Some(DOH_CONTENT_TYPE) => Ok(()),
        Some(other) => Err(DomainError::UnsupportedContentType(other.to_string())),
    }
}
