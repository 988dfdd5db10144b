use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::probe::SystemInfo;

pub const HEALTHY: &str = "healthy";

/// Transient health report returned to load balancers; never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthCheck {
    #[schema(value_type = String, example = "healthy")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub server_info: SystemInfo,
}

impl HealthCheck {
    /// The service is considered healthy whenever it can answer at all.
    pub fn healthy(server_info: SystemInfo) -> Self {
        Self {
            status: HEALTHY,
            timestamp: Utc::now(),
            server_info,
        }
    }
}
