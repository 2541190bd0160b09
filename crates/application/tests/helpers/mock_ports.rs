use async_trait::async_trait;
use ferrous_doh_application::ports::{ResponseCache, UpstreamRelay};
use ferrous_doh_domain::DomainError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Builds an upstream-style answer to `query` with one A record.
pub fn answer_for(query: &Message, ip: Ipv4Addr) -> Message {
    let mut answer = query.clone();
    answer
        .set_message_type(MessageType::Response)
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);

    let name = query.queries()[0].name().clone();
    answer.add_answer(Record::from_rdata(name, 300, RData::A(A(ip))));
    answer
}

pub struct MockUpstreamRelay {
    answer_ip: Ipv4Addr,
    error: Mutex<Option<DomainError>>,
    strip_edns: bool,
    calls: AtomicUsize,
    last_query: Mutex<Option<Message>>,
}

impl MockUpstreamRelay {
    pub fn new() -> Self {
        Self {
            answer_ip: Ipv4Addr::new(93, 184, 216, 34),
            error: Mutex::new(None),
            strip_edns: false,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    /// Answers without an OPT record, like an upstream ignoring EDNS0.
    pub fn without_edns() -> Self {
        Self {
            strip_edns: true,
            ..Self::new()
        }
    }

    pub fn failing(error: DomainError) -> Self {
        let relay = Self::new();
        *relay.error.lock().unwrap() = Some(error);
        relay
    }

    pub fn answer_ip(&self) -> Ipv4Addr {
        self.answer_ip
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<Message> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamRelay for MockUpstreamRelay {
    async fn relay(&self, query: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut answer = answer_for(query, self.answer_ip);
        if self.strip_edns {
            *answer.extensions_mut() = None;
        }
        Ok(answer)
    }
}

pub struct MockResponseCache {
    hit: Mutex<Option<Message>>,
    inserted: Mutex<Vec<Message>>,
    lookups: AtomicUsize,
    last_lookup: Mutex<Option<Message>>,
}

impl MockResponseCache {
    pub fn new() -> Self {
        Self {
            hit: Mutex::new(None),
            inserted: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            last_lookup: Mutex::new(None),
        }
    }

    pub fn with_hit(answer: Message) -> Self {
        let cache = Self::new();
        *cache.hit.lock().unwrap() = Some(answer);
        cache
    }

    pub fn inserted(&self) -> Vec<Message> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn last_lookup(&self) -> Option<Message> {
        self.last_lookup.lock().unwrap().clone()
    }

    pub fn stored_hit(&self) -> Option<Message> {
        self.hit.lock().unwrap().clone()
    }
}

impl ResponseCache for MockResponseCache {
    fn lookup(&self, query: &Message) -> Option<Message> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *self.last_lookup.lock().unwrap() = Some(query.clone());
        self.hit.lock().unwrap().clone()
    }

    fn insert(&self, answer: Message) {
        self.inserted.lock().unwrap().push(answer);
    }
}
