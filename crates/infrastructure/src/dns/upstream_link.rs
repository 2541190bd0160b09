use super::transport::{TransportError, UpstreamConnection};
use async_trait::async_trait;
use ferrous_doh_application::ports::UpstreamRelay;
use ferrous_doh_domain::config::UpstreamConfig;
use ferrous_doh_domain::{DomainError, UpstreamProtocol};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::BinEncodable;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

/// Transport settings fixed when the link is (re)initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub protocol: UpstreamProtocol,
    pub dial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ClientConfig {
    pub fn from_upstream_config(config: &UpstreamConfig) -> Self {
        Self {
            protocol: config.protocol,
            dial_timeout: config.dial_timeout(),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Client configuration and connection live and die together.
#[derive(Debug, Default)]
struct LinkState {
    client: Option<ClientConfig>,
    conn: Option<UpstreamConnection>,
}

impl LinkState {
    fn reset(&mut self) {
        self.client = None;
        self.conn = None;
    }
}

#[derive(Debug, thiserror::Error)]
enum ExchangeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed upstream response: {0}")]
    Malformed(String),

    #[error("Upstream response id {got} does not match query id {expected}")]
    IdMismatch { expected: u16, got: u16 },
}

/// The single reusable connection to the upstream resolver.
///
/// The connection is dialled lazily on the first relay and reused until an
/// exchange fails; any failure drops it so the next relay dials again. All
/// callers share the one connection. Exchanges are serialised by the state
/// lock, which keeps request and response framing of concurrent callers
/// from interleaving.
///
/// Each exchange runs on its own task holding the lock, so a caller that
/// goes away mid-exchange still leaves the connection either drained or
/// reset. Waiting for the lock is bounded by the read timeout.
pub struct UpstreamLink {
    server: SocketAddr,
    settings: ClientConfig,
    state: Arc<Mutex<LinkState>>,
    dials: Arc<AtomicU64>,
}

impl UpstreamLink {
    pub fn new(server: SocketAddr, settings: ClientConfig) -> Self {
        Self {
            server,
            settings,
            state: Arc::new(Mutex::new(LinkState::default())),
            dials: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        self.settings.protocol
    }

    /// Number of dial attempts made so far, successful or not.
    pub fn dial_count(&self) -> u64 {
        self.dials.load(Ordering::Relaxed)
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.conn.is_some()
    }

    /// Drops the connection; the next relay reconnects.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.conn.is_some() {
            debug!(server = %self.server, "Closing upstream connection");
        }
        state.reset();
    }

    fn exchange_task(&self) -> LinkExchange {
        LinkExchange {
            server: self.server,
            settings: self.settings,
            dials: Arc::clone(&self.dials),
        }
    }
}

/// What a detached exchange needs besides the locked state.
struct LinkExchange {
    server: SocketAddr,
    settings: ClientConfig,
    dials: Arc<AtomicU64>,
}

impl LinkExchange {
    async fn run(
        self,
        mut state: OwnedMutexGuard<LinkState>,
        query_bytes: Vec<u8>,
        query_id: u16,
    ) -> Result<Message, DomainError> {
        if let Err(e) = self.ensure_connection(&mut state).await {
            state.reset();
            return Err(DomainError::RelayFailed(format!(
                "client connecting error: {}",
                e
            )));
        }

        let client = state.client.unwrap_or(self.settings);
        let Some(conn) = state.conn.as_mut() else {
            state.reset();
            return Err(DomainError::RelayFailed("client connecting error".to_string()));
        };

        match Self::exchange(conn, &client, query_id, &query_bytes).await {
            Ok(answer) => {
                if let Some(question) = answer.queries().first() {
                    info!(
                        name = %question.name(),
                        qtype = %question.query_type(),
                        "resolved from upstream"
                    );
                }
                Ok(answer)
            }
            Err(e) => {
                state.reset();
                error!(server = %self.server, error = %e, "error when relaying query");
                Err(DomainError::RelayFailed(e.to_string()))
            }
        }
    }

    /// No health check: an existing connection is assumed usable.
    async fn ensure_connection(&self, state: &mut LinkState) -> Result<(), DomainError> {
        let client = *state.client.get_or_insert(self.settings);

        if state.conn.is_some() {
            return Ok(());
        }

        self.dials.fetch_add(1, Ordering::Relaxed);

        match UpstreamConnection::dial(client.protocol, self.server, client.dial_timeout).await {
            Ok(conn) => {
                debug!(
                    server = %self.server,
                    protocol = conn.protocol_name(),
                    "Connected to upstream server"
                );
                state.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                error!(
                    protocol = client.protocol.as_str(),
                    server = %self.server,
                    error = %e,
                    "connect to upstream server failed"
                );
                Err(DomainError::UpstreamUnreachable {
                    server: format!("{}://{}", client.protocol, self.server),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn exchange(
        conn: &mut UpstreamConnection,
        client: &ClientConfig,
        query_id: u16,
        query_bytes: &[u8],
    ) -> Result<Message, ExchangeError> {
        let response_bytes = conn
            .exchange(query_bytes, client.write_timeout, client.read_timeout)
            .await?;

        let answer = Message::from_vec(&response_bytes)
            .map_err(|e| ExchangeError::Malformed(e.to_string()))?;

        if answer.id() != query_id {
            return Err(ExchangeError::IdMismatch {
                expected: query_id,
                got: answer.id(),
            });
        }

        Ok(answer)
    }
}

#[async_trait]
impl UpstreamRelay for UpstreamLink {
    async fn relay(&self, query: &Message) -> Result<Message, DomainError> {
        let query_bytes = query
            .to_vec()
            .map_err(|e| DomainError::RelayFailed(format!("failed to encode query: {}", e)))?;

        let lock_wait = self.settings.read_timeout;
        let state = tokio::time::timeout(lock_wait, Arc::clone(&self.state).lock_owned())
            .await
            .map_err(|_| {
                warn!(
                    server = %self.server,
                    waited_ms = lock_wait.as_millis() as u64,
                    "upstream link busy"
                );
                DomainError::RelayFailed(format!(
                    "upstream link busy for more than {:?}",
                    lock_wait
                ))
            })?;

        let task = tokio::spawn(self.exchange_task().run(state, query_bytes, query.id()));

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(server = %self.server, error = %e, "upstream exchange task failed");
                self.state.lock().await.reset();
                Err(DomainError::RelayFailed(format!(
                    "upstream exchange aborted: {}",
                    e
                )))
            }
        }
    }
}
