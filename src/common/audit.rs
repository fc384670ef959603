//! Forensic Audit Logging
//!
//! Structured audit events for data source selection and common attribute
//! searches, emitted under the `forensic_audit` target.

use std::path::PathBuf;
use tracing::{info, span, warn, Level};
use uuid::Uuid;

/// Log the set of local paths chosen as a new data source
pub fn log_data_sources_selected(paths: &[PathBuf]) {
    let _span = span!(Level::INFO, "data_source_selection", count = paths.len()).entered();

    for path in paths {
        info!(
            target: "forensic_audit",
            operation = "data_source_selected",
            path = %path.display(),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Local data source selected"
        );
    }
}

/// Log a correlation lookup that was skipped during collation
pub fn log_lookup_failure(search_id: &Uuid, attribute_id: i64, reason: &str) {
    warn!(
        target: "forensic_audit",
        search_id = %search_id,
        attribute_id = attribute_id,
        reason = reason,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Correlation lookup skipped"
    );
}

/// Audit context for a single common attribute search pass
pub struct SearchAuditContext {
    pub search_id: Uuid,
    pub kind: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl SearchAuditContext {
    pub fn new(kind: impl Into<String>) -> Self {
        let ctx = Self {
            search_id: Uuid::new_v4(),
            kind: kind.into(),
            started_at: chrono::Utc::now(),
        };

        info!(
            target: "forensic_audit",
            operation = "search_start",
            search_id = %ctx.search_id,
            kind = %ctx.kind,
            timestamp = %ctx.started_at.to_rfc3339(),
            "Common attribute search started"
        );

        ctx
    }

    pub fn log_completed(&self, values: usize, instances: usize) {
        info!(
            target: "forensic_audit",
            operation = "search_complete",
            search_id = %self.search_id,
            kind = %self.kind,
            values = values,
            instances = instances,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Common attribute search completed"
        );
    }
}

impl Drop for SearchAuditContext {
    fn drop(&mut self) {
        let duration = chrono::Utc::now() - self.started_at;
        info!(
            target: "forensic_audit",
            operation = "search_end",
            search_id = %self.search_id,
            duration_ms = duration.num_milliseconds(),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Common attribute search ended"
        );
    }
}
