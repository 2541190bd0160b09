use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;

/// Port for delivering a query to the upstream resolver.
#[async_trait]
pub trait UpstreamRelay: Send + Sync {
    /// Returns the upstream answer unmodified, or `UpstreamUnreachable` /
    /// `RelayFailed`. Implementations perform no internal retry.
    async fn relay(&self, query: &Message) -> Result<Message, DomainError>;
}
