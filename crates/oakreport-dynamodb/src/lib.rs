//! DynamoDB source for oakreport
//!
//! This crate implements the table-source trait over DynamoDB scans,
//! handling pagination, credentials, and attribute conversion.

pub mod data_loader;

pub use data_loader::{DynamoDbConfig, DynamoDbSource};
