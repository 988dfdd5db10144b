use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Serialize, Serializer};
use sysinfo::{Disks, Pid, System};
use utoipa::ToSchema;

const GIB: u64 = 1024 * 1024 * 1024;
const UNKNOWN: &str = "unknown";

/// Host facts reported by `/health` and `/system-info`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemInfo {
    pub platform: String,
    pub release: String,
    pub version: String,
    pub architecture: String,
    pub hostname: String,
    pub ip_address: String,
    pub cpu_count: usize,
    pub memory_total: String,
    pub memory_available: String,
    pub disk_usage: String,
}

/// Facts about this server process.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub cpu_percent: f32,
    pub memory_percent: f64,
    pub open_files: Count,
    pub connections: Count,
}

/// A resource count the platform may not be able to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Known(usize),
    Unsupported,
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Count::Known(n) => serializer.serialize_u64(*n as u64),
            Count::Unsupported => serializer.serialize_str("unsupported"),
        }
    }
}

/// Best-effort host/process reader. Never fails; missing facts become placeholders.
///
/// The `System` handle is long-lived so that per-process CPU usage is measured
/// between consecutive calls rather than always reading zero.
#[derive(Debug)]
pub struct SystemProbe {
    sys: Mutex<System>,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        Self { sys: Mutex::new(sys) }
    }

    fn system(&self) -> MutexGuard<'_, System> {
        // A panicked holder cannot leave `System` in a state worse than stale.
        self.sys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn system_info(&self) -> SystemInfo {
        let (cpu_count, memory_total, memory_available) = {
            let mut sys = self.system();
            sys.refresh_memory();
            (sys.cpus().len(), sys.total_memory(), sys.available_memory())
        };

        let hostname = System::host_name().unwrap_or_else(|| UNKNOWN.to_string());
        let ip_address = resolve_ip(&hostname).await;

        SystemInfo {
            platform: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            release: System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
            version: System::os_version().unwrap_or_else(|| UNKNOWN.to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            hostname,
            ip_address,
            cpu_count: logical_cpus(cpu_count),
            memory_total: format_gib(memory_total),
            memory_available: format_gib(memory_available),
            disk_usage: root_disk_usage(),
        }
    }

    pub fn process_info(&self) -> ProcessInfo {
        let pid = std::process::id();

        let (cpu_percent, memory_percent) = {
            let mut sys = self.system();
            sys.refresh_memory();
            let spid = Pid::from_u32(pid);
            sys.refresh_process(spid);
            match sys.process(spid) {
                Some(process) => (
                    process.cpu_usage(),
                    percent(process.memory(), sys.total_memory()),
                ),
                None => (0.0, 0.0),
            }
        };

        ProcessInfo {
            pid,
            cpu_percent,
            memory_percent,
            open_files: open_file_count(),
            connections: socket_count(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

async fn resolve_ip(hostname: &str) -> String {
    match tokio::net::lookup_host((hostname, 0)).await {
        Ok(mut addrs) => addrs
            .find(|a| a.is_ipv4())
            .map(|a| a.ip().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Err(e) => {
            tracing::debug!(hostname, error = %e, "Hostname did not resolve");
            UNKNOWN.to_string()
        }
    }
}

/// sysinfo reports no CPUs on some sandboxes; ask the scheduler instead.
fn logical_cpus(reported: usize) -> usize {
    if reported > 0 {
        return reported;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(0)
}

fn format_gib(bytes: u64) -> String {
    format!("{} GB", bytes / GIB)
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn root_disk_usage() -> String {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .map(|d| {
            let used = d.total_space().saturating_sub(d.available_space());
            format!("{:.1}%", percent(used, d.total_space()))
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Link targets of every descriptor this process holds.
#[cfg(target_os = "linux")]
fn fd_targets() -> Option<Vec<PathBuf>> {
    let entries = std::fs::read_dir("/proc/self/fd").ok()?;
    Some(
        entries
            .filter_map(Result::ok)
            .filter_map(|e| std::fs::read_link(e.path()).ok())
            .collect(),
    )
}

#[cfg(not(target_os = "linux"))]
fn fd_targets() -> Option<Vec<PathBuf>> {
    None
}

/// Regular files only. Pipes, sockets, devices and directories are skipped.
fn count_regular_files(targets: &[PathBuf]) -> usize {
    targets
        .iter()
        .filter(|t| t.is_absolute())
        .filter(|t| std::fs::metadata(t).map(|m| m.is_file()).unwrap_or(false))
        .count()
}

fn count_sockets(targets: &[PathBuf]) -> usize {
    targets
        .iter()
        .filter(|t| t.to_string_lossy().starts_with("socket:"))
        .count()
}

fn open_file_count() -> Count {
    match fd_targets() {
        Some(targets) => Count::Known(count_regular_files(&targets)),
        None => Count::Unsupported,
    }
}

/// Sockets held by this process, counted from its descriptor table.
fn socket_count() -> Count {
    match fd_targets() {
        Some(targets) => Count::Known(count_sockets(&targets)),
        None => Count::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gib_formatting_truncates() {
        assert_eq!(format_gib(0), "0 GB");
        assert_eq!(format_gib(3 * GIB + GIB / 2), "3 GB");
    }

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(percent(10, 0), 0.0);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn count_serializes_number_or_marker() {
        assert_eq!(serde_json::to_value(Count::Known(3)).unwrap(), serde_json::json!(3));
        assert_eq!(
            serde_json::to_value(Count::Unsupported).unwrap(),
            serde_json::json!("unsupported")
        );
    }

    #[test]
    fn logical_cpus_prefers_reported_count() {
        assert_eq!(logical_cpus(8), 8);
        let scheduler = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0);
        assert_eq!(logical_cpus(0), scheduler);
    }

    #[test]
    fn descriptor_targets_are_classified() {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let targets = vec![
            PathBuf::from("socket:[123]"),
            PathBuf::from("pipe:[4]"),
            PathBuf::from("anon_inode:[eventpoll]"),
            PathBuf::from("/dev/null"),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")),
            manifest,
        ];
        assert_eq!(count_regular_files(&targets), 1);
        assert_eq!(count_sockets(&targets), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn held_file_and_listener_are_counted() {
        let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let _file = std::fs::File::open(manifest).unwrap();
        let _listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

        let info = SystemProbe::new().process_info();
        assert!(matches!(info.open_files, Count::Known(n) if n >= 1));
        assert!(matches!(info.connections, Count::Known(n) if n >= 1));
    }

    #[tokio::test]
    async fn system_info_is_always_populated() {
        let probe = SystemProbe::new();
        let info = probe.system_info().await;
        assert!(info.cpu_count >= 1);
        assert!(!info.architecture.is_empty());
        assert!(info.memory_total.ends_with(" GB"));
        assert!(!info.hostname.is_empty());
    }

    #[test]
    fn process_info_reports_own_pid() {
        let probe = SystemProbe::new();
        let info = probe.process_info();
        assert_eq!(info.pid, std::process::id());
        assert!(info.memory_percent >= 0.0);
    }
}
