pub mod resolve;

pub use resolve::resolve_doh_query;
