//! DynamoDB data loader
//!
//! Scans whole tables with the AWS SDK paginator and converts each item's
//! attribute values into schemaless report items. Retries follow the SDK's
//! standard mode; a page that still fails aborts the scan with a fetch error
//! naming the table.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use oakreport_core::error::{ReportError, Result};
use oakreport_core::source::TableSource;
use oakreport_core::types::{FieldValue, Item};
use std::collections::HashMap;
use tracing::{debug, info};

const MAX_ATTEMPTS: u32 = 10;

/// Connection settings, usually sourced from `VTC_DYNAMODB_*` variables
#[derive(Debug, Clone, Default)]
pub struct DynamoDbConfig {
    /// AWS region; falls back to the SDK's default chain
    pub region: Option<String>,
    /// Static access key; both keys or neither must be set
    pub access_key_id: Option<String>,
    /// Static secret key
    pub secret_access_key: Option<String>,
    /// Custom endpoint, e.g. DynamoDB Local
    pub endpoint_url: Option<String>,
}

/// Table source backed by DynamoDB scans
pub struct DynamoDbSource {
    client: Client,
}

impl DynamoDbSource {
    /// Build a client from `config`
    pub async fn new(config: &DynamoDbConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS));

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials = aws_credential_types::Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "oakreport-env",
                );
                loader = loader.credentials_provider(credentials);
            }
            (None, None) => debug!("Using the default AWS credential chain"),
            _ => {
                return Err(ReportError::Config(
                    "both an access key id and a secret access key are required".into(),
                ));
            }
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let Some(region) = sdk_config.region() else {
            return Err(ReportError::Config(
                "no AWS region configured; set VTC_DYNAMODB_REGION or --region".into(),
            ));
        };
        info!("Connecting to DynamoDB in {}", region);

        Ok(Self {
            client: Client::new(&sdk_config),
        })
    }
}

#[async_trait]
impl TableSource for DynamoDbSource {
    fn name(&self) -> &str {
        "dynamodb"
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut pages = self
            .client
            .scan()
            .table_name(table)
            .into_paginator()
            .send();

        let mut page_count = 0usize;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ReportError::fetch(table, DisplayErrorContext(&e)))?;
            items.extend(page.items().iter().map(convert_item));
            page_count += 1;
        }

        debug!("Scanned {} items from {} in {} pages", items.len(), table, page_count);
        Ok(items)
    }
}

/// Convert one DynamoDB item
pub fn convert_item(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .map(|(name, value)| (name.clone(), convert_attribute(value)))
        .collect()
}

/// Convert one attribute value
///
/// Numbers arrive as decimal strings; one that does not parse as `f64` is
/// kept as text so the normalizer can still report it.
pub fn convert_attribute(value: &AttributeValue) -> FieldValue {
    match value {
        AttributeValue::S(s) => FieldValue::Text(s.clone()),
        AttributeValue::N(n) => n
            .parse::<f64>()
            .map(FieldValue::Number)
            .unwrap_or_else(|_| FieldValue::Text(n.clone())),
        AttributeValue::Bool(b) => FieldValue::Bool(*b),
        AttributeValue::Null(_) => FieldValue::Null,
        _ => FieldValue::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(
            convert_attribute(&AttributeValue::S("a1@vtc.edu.hk".into())),
            FieldValue::Text("a1@vtc.edu.hk".into())
        );
        assert_eq!(
            convert_attribute(&AttributeValue::N("1700000000000".into())),
            FieldValue::Number(1_700_000_000_000.0)
        );
        assert_eq!(
            convert_attribute(&AttributeValue::Bool(true)),
            FieldValue::Bool(true)
        );
        assert_eq!(convert_attribute(&AttributeValue::Null(true)), FieldValue::Null);
    }

    #[test]
    fn test_convert_collections_are_opaque() {
        assert_eq!(
            convert_attribute(&AttributeValue::L(vec![AttributeValue::S("x".into())])),
            FieldValue::Other
        );
        assert_eq!(
            convert_attribute(&AttributeValue::Ss(vec!["x".into()])),
            FieldValue::Other
        );
    }

    #[test]
    fn test_convert_item() {
        let item = HashMap::from([
            ("account".to_string(), AttributeValue::S("A1".into())),
            ("createdAt".to_string(), AttributeValue::N("1700000000".into())),
        ]);
        let converted = convert_item(&item);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted["createdAt"], FieldValue::Number(1_700_000_000.0));
    }

    #[tokio::test]
    async fn test_partial_credentials_rejected() {
        let config = DynamoDbConfig {
            region: Some("ap-east-1".into()),
            access_key_id: Some("AKIA".into()),
            ..DynamoDbConfig::default()
        };
        let result = DynamoDbSource::new(&config).await;
        assert!(matches!(result, Err(ReportError::Config(_))));
    }

    #[tokio::test]
    async fn test_client_builds_with_static_credentials() {
        let config = DynamoDbConfig {
            region: Some("ap-east-1".into()),
            access_key_id: Some("AKIA".into()),
            secret_access_key: Some("secret".into()),
            endpoint_url: Some("http://localhost:8000".into()),
        };
        let source = DynamoDbSource::new(&config).await.unwrap();
        assert_eq!(source.name(), "dynamodb");
    }
}
