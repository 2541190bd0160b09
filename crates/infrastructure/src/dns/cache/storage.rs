use super::key::CacheKey;
use super::metrics::CacheMetrics;
use dashmap::DashMap;
use ferrous_doh_application::ports::ResponseCache;
use ferrous_doh_domain::config::CacheConfig;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Record, RecordType};
use std::sync::Arc;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::time::{Duration, Instant};
use tracing::{debug, info};

struct CachedAnswer {
    message: Message,
    inserted_at: Instant,
    ttl: Duration,
}

impl CachedAnswer {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }

    /// Copy of the stored answer with every record TTL reduced by the time
    /// spent in the cache.
    fn aged(&self, now: Instant) -> Message {
        let elapsed = now.saturating_duration_since(self.inserted_at).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);

        let mut message = self.message.clone();
        let answers = age_records(message.take_answers(), elapsed);
        let name_servers = age_records(message.take_name_servers(), elapsed);
        let additionals = age_records(message.take_additionals(), elapsed);
        message.insert_answers(answers);
        message.insert_name_servers(name_servers);
        message.insert_additionals(additionals);
        message
    }
}

fn age_records(mut records: Vec<Record>, elapsed: u32) -> Vec<Record> {
    for record in records.iter_mut().filter(|r| r.record_type() != RecordType::OPT) {
        let ttl = record.ttl().saturating_sub(elapsed);
        record.set_ttl(ttl);
    }
    records
}

/// In-memory answer cache keyed by question and Client-Subnet.
pub struct MemoryResponseCache {
    entries: DashMap<CacheKey, CachedAnswer>,
    max_entries: usize,
    min_ttl: u32,
    max_ttl: u32,
    metrics: Arc<CacheMetrics>,
}

impl MemoryResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        info!(
            max_entries = config.max_entries,
            min_ttl = config.min_ttl_secs,
            max_ttl = config.max_ttl_secs,
            "Initializing response cache"
        );

        Self {
            entries: DashMap::with_capacity(config.max_entries.min(4096)),
            max_entries: config.max_entries,
            min_ttl: config.min_ttl_secs,
            max_ttl: config.max_ttl_secs,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Aged copy of a live entry; an expired one is dropped on the way.
    fn get_fresh(&self, key: &CacheKey, now: Instant) -> Option<Message> {
        match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.aged(now)),
            Some(_) => {}
        }

        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            CacheMetrics::bump(&self.metrics.expirations);
        }
        None
    }

    /// Seconds the answer may be served from cache, or `None` when it must
    /// not be cached at all.
    fn cacheable_ttl(&self, answer: &Message) -> Option<u32> {
        if answer.truncated() {
            return None;
        }

        match answer.response_code() {
            ResponseCode::NoError | ResponseCode::NXDomain => {}
            _ => return None,
        }

        let min_record_ttl = answer
            .answers()
            .iter()
            .chain(answer.name_servers())
            .chain(answer.additionals())
            .filter(|r| r.record_type() != RecordType::OPT)
            .map(Record::ttl)
            .min()?;

        let ttl = min_record_ttl.clamp(self.min_ttl, self.max_ttl.max(self.min_ttl));
        (ttl > 0).then_some(ttl)
    }

    fn make_room(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }

        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            self.metrics
                .expirations
                .fetch_add(purged as u64, AtomicOrdering::Relaxed);
            debug!(purged, "Purged expired cache entries");
        }

        while self.entries.len() >= self.max_entries {
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            let Some(victim) = victim else { break };
            if self.entries.remove(&victim).is_some() {
                CacheMetrics::bump(&self.metrics.evictions);
            }
        }
    }
}

impl ResponseCache for MemoryResponseCache {
    /// An answer stored without a Client-Subnet option is valid for every
    /// subnet and backs a miss on the subnet-specific key.
    fn lookup(&self, query: &Message) -> Option<Message> {
        let key = CacheKey::from_message(query)?;
        let now = Instant::now();

        let hit = self.get_fresh(&key, now).or_else(|| {
            key.subnet.as_ref()?;
            let any_subnet = CacheKey {
                subnet: None,
                ..key.clone()
            };
            self.get_fresh(&any_subnet, now)
        });

        match hit {
            Some(answer) => {
                CacheMetrics::bump(&self.metrics.hits);
                Some(answer)
            }
            None => {
                CacheMetrics::bump(&self.metrics.misses);
                None
            }
        }
    }

    fn insert(&self, answer: Message) {
        let Some(key) = CacheKey::from_message(&answer) else {
            CacheMetrics::bump(&self.metrics.rejected);
            return;
        };

        let Some(ttl) = self.cacheable_ttl(&answer) else {
            CacheMetrics::bump(&self.metrics.rejected);
            debug!(name = %key.name, rcode = %answer.response_code(), "Answer not cacheable");
            return;
        };

        if !self.entries.contains_key(&key) {
            self.make_room();
        }

        debug!(name = %key.name, qtype = key.record_type, ttl, "Caching answer");

        self.entries.insert(
            key,
            CachedAnswer {
                message: answer,
                inserted_at: Instant::now(),
                ttl: Duration::from_secs(u64::from(ttl)),
            },
        );
        CacheMetrics::bump(&self.metrics.insertions);
    }
}
