//! # Queue Engine Configuration
//!
//! All tunables are supplied at construction; nothing is hard-coded in the
//! components. Defaults model a small recovery-station tenant and are
//! overridable from the environment (`KIOSK_*` variables) or a TOML file.

use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Configuration for queue prioritization, wait estimation, and expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Tenant-wide ceiling on parallel servicing of one service
    pub service_parallel_limit: i32,
    /// Maximum tickets an operator may hold in {Called, InProgress}
    pub operator_concurrent_limit: i64,
    /// Master switch for the auto-expiry sweeper
    pub auto_expire_enabled: bool,
    /// Fallback duration when a service carries no metadata
    pub default_service_duration_minutes: i64,
    /// Per-service duration overrides, keyed by service name
    pub service_durations: HashMap<String, i64>,
    /// Average wait at or below this is a healthy queue
    pub normal_waiting_minutes: i64,
    /// Average wait at or below this (with few escalations) is a warning
    pub warning_waiting_minutes: i64,
    /// Individual wait beyond this escalates the ticket to High
    pub critical_waiting_minutes: i64,
    /// Queued age beyond which the sweeper expires a ticket
    pub auto_expire_minutes: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            service_parallel_limit: 3,
            operator_concurrent_limit: 2,
            auto_expire_enabled: true,
            default_service_duration_minutes: 30,
            service_durations: HashMap::new(),
            normal_waiting_minutes: 15,
            warning_waiting_minutes: 30,
            critical_waiting_minutes: 45,
            auto_expire_minutes: 120,
        }
    }
}

impl QueueConfig {
    /// Build configuration from environment variables, starting from
    /// defaults. Unset variables keep their default.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("KIOSK_SERVICE_PARALLEL_LIMIT") {
            config.service_parallel_limit = limit.parse().map_err(|e| {
                QueueError::Configuration(format!("Invalid service_parallel_limit: {e}"))
            })?;
        }

        if let Ok(limit) = std::env::var("KIOSK_OPERATOR_CONCURRENT_LIMIT") {
            config.operator_concurrent_limit = limit.parse().map_err(|e| {
                QueueError::Configuration(format!("Invalid operator_concurrent_limit: {e}"))
            })?;
        }

        if let Ok(enabled) = std::env::var("KIOSK_AUTO_EXPIRE_ENABLED") {
            config.auto_expire_enabled = enabled.parse().map_err(|e| {
                QueueError::Configuration(format!("Invalid auto_expire_enabled: {e}"))
            })?;
        }

        if let Ok(minutes) = std::env::var("KIOSK_AUTO_EXPIRE_MINUTES") {
            config.auto_expire_minutes = minutes.parse().map_err(|e| {
                QueueError::Configuration(format!("Invalid auto_expire_minutes: {e}"))
            })?;
        }

        if let Ok(minutes) = std::env::var("KIOSK_CRITICAL_WAITING_MINUTES") {
            config.critical_waiting_minutes = minutes.parse().map_err(|e| {
                QueueError::Configuration(format!("Invalid critical_waiting_minutes: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file, with `KIOSK_*` environment
    /// variables taking precedence over file values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("KIOSK").try_parsing(true))
            .build()
            .map_err(|e| QueueError::Configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| QueueError::Configuration(e.to_string()))
    }

    /// Resolve the configured duration for a service name
    pub fn duration_for(&self, service_name: &str) -> i64 {
        self.service_durations
            .get(service_name)
            .copied()
            .unwrap_or(self.default_service_duration_minutes)
    }
}
