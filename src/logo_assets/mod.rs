pub mod service;

pub use service::IconResolver;
