use hickory_proto::op::Message;

/// Port for the response cache.
///
/// Entries are keyed by question name, question type and the EDNS0
/// Client-Subnet option. Keys ignore the transaction id, so callers must
/// rewrite the id of a hit before answering with it.
pub trait ResponseCache: Send + Sync {
    /// Must not block on network I/O.
    fn lookup(&self, query: &Message) -> Option<Message>;

    fn insert(&self, answer: Message);
}
