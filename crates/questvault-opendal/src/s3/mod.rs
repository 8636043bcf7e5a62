//! S3 compatible storage.

mod config;

pub use config::S3Config;
