//! Compliance audit trail for server-side flag evaluations.
//!
//! One record per successful evaluation. Sinks are injected into the Context Store;
//! the production sink writes a structured `tracing` event at target
//! `flagbridge::audit`, the memory sink collects records for inspection.

use crate::flags::{EvaluationSource, FlagSet};
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// RFC 3339 UTC timestamp with millisecond precision, `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub action: String,
    pub user_id: String,
    pub user_role: String,
    pub organization_id: String,
    pub organization_tier: String,
    pub flags: FlagSet,
    pub source: EvaluationSource,
    pub timestamp: String,
}

impl AuditRecord {
    pub fn flag_evaluation(
        user_id: &str,
        user_role: &str,
        organization_id: &str,
        organization_tier: &str,
        flags: FlagSet,
        source: EvaluationSource,
        timestamp: String,
    ) -> Self {
        Self {
            action: "flag_evaluation".to_string(),
            user_id: user_id.to_string(),
            user_role: user_role.to_string(),
            organization_id: organization_id.to_string(),
            organization_tier: organization_tier.to_string(),
            flags,
            source,
            timestamp,
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Writes audit records through the logging pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        let flags = serde_json::to_string(&record.flags).unwrap_or_default();
        info!(
            target: "flagbridge::audit",
            action = %record.action,
            user_id = %record.user_id,
            user_role = %record.user_role,
            organization_id = %record.organization_id,
            organization_tier = %record.organization_tier,
            flags = %flags,
            source = %record.source,
            timestamp = %record.timestamp,
            "Server-side flag evaluation completed"
        );
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records.lock().push(record);
    }
}
