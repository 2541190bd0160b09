use ferrous_doh_application::ports::ResponseCache;
use ferrous_doh_application::use_cases::ResolveDohQueryUseCase;
use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::dns::{ClientConfig, MemoryResponseCache, UpstreamLink};
use std::sync::Arc;
use tracing::info;

pub struct DohServices {
    pub link: Arc<UpstreamLink>,
    pub resolve: Arc<ResolveDohQueryUseCase>,
}

impl DohServices {
    /// Must be called within a tokio runtime when the cache is enabled.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let upstream_addr = config.upstream_addr()?;
        let link = Arc::new(UpstreamLink::new(
            upstream_addr,
            ClientConfig::from_upstream_config(&config.upstream),
        ));

        info!(
            server = %upstream_addr,
            protocol = config.upstream.protocol.as_str(),
            "Upstream link configured"
        );

        let mut resolve = ResolveDohQueryUseCase::new(link.clone());

        if config.cache.enabled {
            let cache: Arc<dyn ResponseCache> = Arc::new(MemoryResponseCache::new(&config.cache));
            resolve = resolve.with_cache(cache, config.cache.insert_queue_capacity);
        } else {
            info!("Response cache disabled");
        }

        Ok(Self {
            link,
            resolve: Arc::new(resolve),
        })
    }
}
