use crate::ports::{ResponseCache, UpstreamRelay};
use crate::services::query_builder::QueryBuilder;
use crate::services::CacheWriter;
use ferrous_doh_domain::{DomainError, ResolveParams};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::BinEncodable;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Wire-format answer ready to be written as the HTTP body.
#[derive(Debug, Clone)]
pub struct DohAnswer {
    pub bytes: Vec<u8>,
    pub cache_hit: bool,
}

pub struct ResolveDohQueryUseCase {
    relay: Arc<dyn UpstreamRelay>,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_writer: Option<CacheWriter>,
}

impl ResolveDohQueryUseCase {
    pub fn new(relay: Arc<dyn UpstreamRelay>) -> Self {
        Self {
            relay,
            cache: None,
            cache_writer: None,
        }
    }

    /// Enables the cache lookup and the fire-and-forget insert. Must be
    /// called within a tokio runtime.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>, insert_queue_capacity: usize) -> Self {
        self.cache_writer = Some(CacheWriter::spawn(Arc::clone(&cache), insert_queue_capacity));
        self.cache = Some(cache);
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub async fn execute(&self, params: &ResolveParams) -> Result<DohAnswer, DomainError> {
        let query = QueryBuilder::build(params)?;

        if let Some(cache) = &self.cache {
            if let Some(mut answer) = cache.lookup(&query) {
                answer.set_id(query.id());
                info!(name = params.name(), "resolved from cache");
                return pack(&answer, true);
            }
        }

        let answer = self.relay.relay(&query).await?;

        if let Some(writer) = &self.cache_writer {
            writer.offer(answer.clone());
        }

        debug!(answer = ?answer, "upstream answer");
        pack(&answer, false)
    }
}

fn pack(answer: &Message, cache_hit: bool) -> Result<DohAnswer, DomainError> {
    let bytes = answer.to_vec().map_err(|e| {
        error!(error = %e, "failed to pack answer");
        DomainError::PackingFailure(e.to_string())
    })?;

    Ok(DohAnswer { bytes, cache_hit })
}
