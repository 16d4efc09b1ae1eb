pub mod elasticsearch;

pub use elasticsearch::ElasticsearchPublisher;
