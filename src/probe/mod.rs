//! Read-only host, process and cloud-instance facts.
//!
//! Nothing in here returns an error to its caller: unavailable facts degrade to
//! placeholder values and an unreachable metadata service degrades to
//! [`InstanceMetadata::local`].

mod env;
mod metadata;
mod system;

pub use env::EnvironmentVariables;
pub use metadata::{InstanceMetadata, MetadataClient};
pub use system::{SystemInfo, SystemProbe};
