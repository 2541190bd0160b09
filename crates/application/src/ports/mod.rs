mod response_cache;
mod upstream_relay;

pub use response_cache::ResponseCache;
pub use upstream_relay::UpstreamRelay;
