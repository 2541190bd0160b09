#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

pub const MOCK_ANSWER_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const MOCK_ANSWER_TTL: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Answer,
    /// Answers with the id flipped.
    WrongId,
    /// TCP only: answers one query, then closes the stream.
    CloseAfterFirst,
    Silent,
    /// Answers correctly, but only after the given delay.
    Delayed(Duration),
}

impl MockBehavior {
    fn delay(self) -> Option<Duration> {
        match self {
            Self::Delayed(delay) => Some(delay),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Counters {
    connections: AtomicUsize,
    queries: AtomicUsize,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    counters: Arc<Counters>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn udp(behavior: MockBehavior) -> Self {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let counters = Arc::new(Counters::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_counters = Arc::clone(&counters);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            let mut peers = Vec::new();

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        if !peers.contains(&peer) {
                            peers.push(peer);
                            task_counters.connections.fetch_add(1, Ordering::SeqCst);
                        }
                        task_counters.queries.fetch_add(1, Ordering::SeqCst);

                        let Some(response) = build_mock_response(&buf[..len], behavior) else {
                            continue;
                        };
                        match behavior.delay() {
                            Some(delay) => {
                                let socket = Arc::clone(&socket);
                                tokio::spawn(async move {
                                    tokio::time::sleep(delay).await;
                                    let _ = socket.send_to(&response, peer).await;
                                });
                            }
                            None => {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            counters,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub async fn tcp(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let counters = Arc::new(Counters::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_counters = Arc::clone(&counters);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { continue };
                        task_counters.connections.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(serve_tcp(stream, behavior, Arc::clone(&task_counters)));
                    }
                }
            }
        });

        Self {
            addr,
            counters,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// TCP: accepted streams. UDP: distinct client sockets seen.
    pub fn connections(&self) -> usize {
        self.counters.connections.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.counters.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_tcp(mut stream: TcpStream, behavior: MockBehavior, counters: Arc<Counters>) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }
        counters.queries.fetch_add(1, Ordering::SeqCst);

        let Some(response) = build_mock_response(&query, behavior) else {
            continue;
        };

        if let Some(delay) = behavior.delay() {
            tokio::time::sleep(delay).await;
        }

        let mut framed = (response.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&response);
        if stream.write_all(&framed).await.is_err() {
            return;
        }

        if behavior == MockBehavior::CloseAfterFirst {
            let _ = stream.shutdown().await;
            return;
        }
    }
}

/// Echoes the question (and its OPT record) with a single A answer.
pub fn build_mock_response(query: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
    if behavior == MockBehavior::Silent {
        return None;
    }

    let query = Message::from_vec(query).ok()?;
    let mut response = query.clone();
    response
        .set_message_type(MessageType::Response)
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);

    if behavior == MockBehavior::WrongId {
        response.set_id(query.id() ^ 0xFFFF);
    }

    if let Some(question) = query.queries().first() {
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            MOCK_ANSWER_TTL,
            RData::A(A(MOCK_ANSWER_IP)),
        ));
    }

    response.to_vec().ok()
}
