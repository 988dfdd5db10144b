use std::time::Duration;

use serde::Serialize;
use tracing::debug;

pub const LOCAL_INSTANCE_ID: &str = "local-development";
pub const LOCAL_NOTE: &str = "Not running on EC2";

/// Outcome of an instance metadata probe.
///
/// Serialises untagged: `Cloud` as the five fetched fields, `Local` as the
/// fixed `{instance_id: "local-development", note: "Not running on EC2"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InstanceMetadata {
    Cloud(Ec2Metadata),
    Local(LocalFallback),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ec2Metadata {
    pub instance_id: String,
    pub availability_zone: String,
    pub instance_type: String,
    pub public_ip: String,
    pub private_ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalFallback {
    pub instance_id: &'static str,
    pub note: &'static str,
}

impl InstanceMetadata {
    pub fn local() -> Self {
        InstanceMetadata::Local(LocalFallback {
            instance_id: LOCAL_INSTANCE_ID,
            note: LOCAL_NOTE,
        })
    }

    pub fn instance_id(&self) -> &str {
        match self {
            InstanceMetadata::Cloud(m) => &m.instance_id,
            InstanceMetadata::Local(f) => f.instance_id,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, InstanceMetadata::Cloud(_))
    }
}

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{field} returned HTTP {status}")]
    Status {
        field: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Reads cloud instance metadata over HTTP.
///
/// Every field fetch is bounded by the configured timeout. Failures never
/// escape: any error turns the whole result into [`InstanceMetadata::local`].
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
    server_id: std::sync::Arc<tokio::sync::OnceCell<String>>,
}

impl MetadataClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                debug!(error = %e, "Falling back to default metadata HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.into(),
            server_id: Default::default(),
        }
    }

    /// Probes the metadata service afresh.
    pub async fn fetch(&self) -> InstanceMetadata {
        match self.try_fetch().await {
            Ok(metadata) => InstanceMetadata::Cloud(metadata),
            Err(e) => {
                debug!(error = %e, base_url = %self.base_url, "Instance metadata unavailable");
                InstanceMetadata::local()
            }
        }
    }

    /// Instance id of this host, probed once and then cached for the process lifetime.
    pub async fn server_id(&self) -> String {
        self.server_id
            .get_or_init(|| async { self.fetch().await.instance_id().to_string() })
            .await
            .clone()
    }

    /// Probes afresh and seeds the cached server id with the outcome.
    pub async fn fetch_and_cache(&self) -> InstanceMetadata {
        let metadata = self.fetch().await;
        // Already-cached ids stay put so a process never reports two identities.
        let _ = self.server_id.set(metadata.instance_id().to_string());
        metadata
    }

    async fn try_fetch(&self) -> Result<Ec2Metadata, FetchError> {
        // instance-id doubles as the "are we on EC2 at all" check.
        let instance_id = self.field("instance-id").await?;

        let (availability_zone, instance_type, public_ip, private_ip) = tokio::try_join!(
            self.field("placement/availability-zone"),
            self.field("instance-type"),
            self.field("public-ipv4"),
            self.field("local-ipv4"),
        )?;

        Ok(Ec2Metadata {
            instance_id,
            availability_zone,
            instance_type,
            public_ip,
            private_ip,
        })
    }

    async fn field(&self, field: &'static str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, field);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { field, status });
        }
        Ok(resp.text().await?.trim().to_string())
    }
}
