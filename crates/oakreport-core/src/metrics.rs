//! Metric → usage-type mapping
//!
//! A [`MetricsUsageTypeMap`] is an ordered list of report metrics, each
//! aggregating one or more raw usage types. The order defines the report's
//! column order. The map is built once at startup and passed explicitly to
//! the [`Aggregator`](crate::aggregation::Aggregator).
//!
//! A usage type listed under several metrics increments every one of them.
//!
//! # Examples
//!
//! ```
//! use oakreport_core::metrics::{MetricMapping, MetricsUsageTypeMap};
//! use oakreport_core::types::UsageType;
//!
//! let map = MetricsUsageTypeMap::new(vec![
//!     MetricMapping::new("Chat Messages", ["chat"]),
//! ])
//! .unwrap();
//!
//! assert_eq!(map.metrics_for(&UsageType::new("chat")), &[0]);
//! assert!(map.metrics_for(&UsageType::new("upload")).is_empty());
//! ```

use crate::aggregation::ACCOUNT_COLUMNS;
use crate::error::{ReportError, Result};
use crate::types::UsageType;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Usage type assigned to every record read from the AI-assist log table
pub const AI_ASSIST_USAGE_TYPE: &str = "ask ai";

/// One metric and the raw usage types it counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMapping {
    /// Column name in the report
    pub metric: String,
    /// Raw usage types counted by this metric
    #[serde(default)]
    pub usage_types: Vec<String>,
}

impl MetricMapping {
    /// Create a mapping
    pub fn new<I, S>(metric: impl Into<String>, usage_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metric: metric.into(),
            usage_types: usage_types.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered, read-only metric map with a reverse index by usage type
#[derive(Debug, Clone)]
pub struct MetricsUsageTypeMap {
    mappings: Vec<MetricMapping>,
    index: HashMap<UsageType, SmallVec<[usize; 2]>>,
}

impl MetricsUsageTypeMap {
    /// Build a map, rejecting empty or duplicate metric names and names that
    /// clash with the account columns
    pub fn new(mappings: Vec<MetricMapping>) -> Result<Self> {
        let mut seen = HashSet::new();
        for mapping in &mappings {
            if mapping.metric.trim().is_empty() {
                return Err(ReportError::Config("metric names must not be empty".into()));
            }
            if ACCOUNT_COLUMNS.contains(&mapping.metric.as_str()) {
                return Err(ReportError::Config(format!(
                    "metric '{}' clashes with an account column",
                    mapping.metric
                )));
            }
            if !seen.insert(mapping.metric.as_str()) {
                return Err(ReportError::Config(format!(
                    "metric '{}' is defined more than once",
                    mapping.metric
                )));
            }
        }

        Ok(Self {
            index: build_index(&mappings),
            mappings,
        })
    }

    /// Parse a JSON array of `{"metric": ..., "usage_types": [...]}` objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mappings: Vec<MetricMapping> = serde_json::from_str(json)?;
        Self::new(mappings)
    }

    /// Load a JSON metric map from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("cannot read metric map {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Indices of the metrics a usage type contributes to
    pub fn metrics_for(&self, usage_type: &UsageType) -> &[usize] {
        self.index
            .get(usage_type)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
    }

    /// Metric names in column order
    pub fn metric_names(&self) -> Vec<String> {
        self.mappings.iter().map(|m| m.metric.clone()).collect()
    }

    /// Number of metrics
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the map has no metrics
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// The underlying mappings
    pub fn mappings(&self) -> &[MetricMapping] {
        &self.mappings
    }
}

impl Default for MetricsUsageTypeMap {
    /// The VTC OAK cohort's metric set
    fn default() -> Self {
        let empty: [&str; 0] = [];
        let mappings = vec![
            MetricMapping::new("Logins", empty),
            MetricMapping::new("Uploads", empty),
            MetricMapping::new("Generated Transcripts", ["transcript"]),
            MetricMapping::new("Regenerated Transcripts", ["regenerate transcript"]),
            MetricMapping::new("Initial Summaries", ["initial summary"]),
            MetricMapping::new("Regenerated Summaries", ["regenerate summary"]),
            MetricMapping::new("Regenerated Notes", ["regenerate note"]),
            MetricMapping::new("AskAI Questions", [AI_ASSIST_USAGE_TYPE]),
        ];
        Self {
            index: build_index(&mappings),
            mappings,
        }
    }
}

fn build_index(mappings: &[MetricMapping]) -> HashMap<UsageType, SmallVec<[usize; 2]>> {
    let mut index: HashMap<UsageType, SmallVec<[usize; 2]>> = HashMap::new();
    for (position, mapping) in mappings.iter().enumerate() {
        for usage_type in &mapping.usage_types {
            let slots = index.entry(UsageType::new(usage_type.clone())).or_default();
            // The same usage type listed twice under one metric counts once
            if !slots.contains(&position) {
                slots.push(position);
            }
        }
    }
    index
}
