use serde::Deserialize;

/// Query parameters of `GET /resolve`.
///
/// Every field is optional at this level so a missing parameter surfaces as a
/// translation error from the query builder rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub ct: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub record_type: Option<String>,

    #[serde(default)]
    pub edns_client_subnet: Option<String>,
}

impl ResolveParams {
    pub fn new(name: &str, record_type: &str, edns_client_subnet: &str) -> Self {
        Self {
            ct: None,
            name: Some(name.to_string()),
            record_type: Some(record_type.to_string()),
            edns_client_subnet: Some(edns_client_subnet.to_string()),
        }
    }

    pub fn with_content_type(mut self, ct: &str) -> Self {
        self.ct = Some(ct.to_string());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn record_type(&self) -> &str {
        self.record_type.as_deref().unwrap_or_default()
    }

    pub fn edns_client_subnet(&self) -> &str {
        self.edns_client_subnet.as_deref().unwrap_or_default()
    }
}
