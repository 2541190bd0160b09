//! Ferrous DoH Domain Layer
pub mod client_subnet;
pub mod config;
pub mod content_type;
pub mod errors;
pub mod resolve_params;
pub mod upstream_protocol;

pub use client_subnet::ClientSubnetOption;
pub use config::{CliOverrides, Config, ConfigError};
pub use content_type::{accepts_doh, check_content_type_param, DOH_CONTENT_TYPE};
pub use errors::DomainError;
pub use resolve_params::ResolveParams;
pub use upstream_protocol::UpstreamProtocol;
