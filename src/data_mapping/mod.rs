//! Channel enrichment: grouping, icons and identifiers

pub mod engine;
pub mod groups;
pub mod naming;

pub use engine::ChannelEnricher;
pub use groups::GroupClassifier;
pub use naming::NameNormalizer;
