//! Per-user template preference relation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `(user, template) -> {enabled, usage_count, last_used_at}`.
///
/// At most one record exists per `(user_id, template_name)` pair; the
/// repository layer enforces the unique constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTemplatePreference {
    pub user_id: String,
    pub template_name: String,
    pub enabled: bool,
    pub usage_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl UserTemplatePreference {
    pub fn new(user_id: impl Into<String>, template_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            user_id: user_id.into(),
            template_name: template_name.into(),
            enabled,
            usage_count: 0,
            last_used_at: None,
        }
    }

    /// Record a successful invocation: bump `usage_count` and stamp
    /// `last_used_at` (spec §4.4 — core agents are exempt from tracking;
    /// the caller is responsible for not calling this for core templates).
    pub fn record_usage(&mut self) {
        self.usage_count += 1;
        self.last_used_at = Some(Utc::now());
    }
}
