mod api_request;
mod application;

pub use api_request::*;
pub use application::*;

/// Property every document in this crate is partitioned on.
pub const PARTITION_KEY_PATH: &str = "/partitionKey";
