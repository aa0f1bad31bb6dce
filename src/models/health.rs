use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "healthy" or "degraded"
    pub status: String,
    pub database: DatabaseHealth,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.database.connected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    /// Only reported while the database is reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}

/// Connection pool counters as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    #[serde(default)]
    pub opened: u32,
    #[serde(default)]
    pub busy: u32,
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub min: u32,
}

impl PoolStats {
    /// Open connections not currently checked out.
    pub fn idle(&self) -> u32 {
        self.opened.saturating_sub(self.busy)
    }

    /// Busy connections as a percentage of the pool maximum.
    pub fn utilization_percent(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.busy) / f64::from(self.max) * 100.0
        }
    }
}

/// Response of `GET /db/pool-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub status: String,
    pub pool: PoolStats,
    #[serde(default)]
    pub utilization_percent: f64,
}

/// Response of `GET /ai/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiHealth {
    pub status: String,
    /// Component name to availability (orchestrator, specialists, llm, ...)
    #[serde(default)]
    pub components: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.error.is_none()
    }

    /// Names of components reported as down, in name order.
    pub fn unavailable_components(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|(_, up)| !**up)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
