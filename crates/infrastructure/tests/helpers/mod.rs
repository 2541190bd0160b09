pub mod dns_server_mock;

pub use dns_server_mock::{MockBehavior, MockDnsServer, MOCK_ANSWER_IP, MOCK_ANSWER_TTL};
