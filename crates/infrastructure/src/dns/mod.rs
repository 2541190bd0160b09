pub mod cache;
pub mod transport;
pub mod upstream_link;

pub use cache::{CacheKey, CacheMetrics, MemoryResponseCache};
pub use upstream_link::{ClientConfig, UpstreamLink};
