pub mod resolve_doh_query;

pub use resolve_doh_query::{DohAnswer, ResolveDohQueryUseCase};
