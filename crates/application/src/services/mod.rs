pub mod cache_writer;
pub mod query_builder;

pub use cache_writer::CacheWriter;
pub use query_builder::QueryBuilder;
