//! Network key-value backends
//!
//! Both backends share one data layout, so data written through one can be read
//! through the other:
//!
//! - `wiki:users` hash: `username -> password hash`
//! - `wiki:sessions` hash: `session id -> username`
//! - `wiki:<segment>:<username>` string: JSON-encoded array, see [`Resource::key`]
//!
//! They differ only in transport: [`RedisUrlStorage`] keeps a multiplexed Redis
//! connection, [`RestStorage`] sends one authenticated HTTP request per command.
//!
//! [`Resource::key`]: crate::backend::Resource::key

mod redis_url;
mod rest;

pub use redis_url::RedisUrlStorage;
pub use rest::RestStorage;
