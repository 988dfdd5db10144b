use serde::Serialize;

pub const NOT_SET: &str = "not-set";
pub const DEFAULT_ENV: &str = "development";

/// Deployment variables echoed by `/aws-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentVariables {
    #[serde(rename = "AWS_REGION")]
    pub aws_region: String,
    #[serde(rename = "AWS_AVAILABILITY_ZONE")]
    pub aws_availability_zone: String,
    #[serde(rename = "ENV")]
    pub env: String,
}

impl EnvironmentVariables {
    /// Reads the live process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        Self {
            aws_region: get("AWS_REGION", NOT_SET),
            aws_availability_zone: get("AWS_AVAILABILITY_ZONE", NOT_SET),
            env: get("ENV", DEFAULT_ENV),
        }
    }
}
