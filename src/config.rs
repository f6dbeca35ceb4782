//! Process configuration, loaded once at start-up and passed by reference.
//!
//! Sources are layered in this order: built-in defaults, the TOML file, then
//! `DASHBOARD__*` environment variables (e.g. `DASHBOARD__BOOKING_API__PASSWORD`).

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{builder::DefaultState, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const ENV_PREFIX: &str = "DASHBOARD";
/// Central European Time, ignoring daylight saving.
pub const DEFAULT_TIMEZONE_OFFSET_MINUTES: i32 = 60;

/// Default config file location (`~/.config/chain-dashboard/dashboard.toml`
/// on Linux).
pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        dir.join("chain-dashboard").join("dashboard.toml")
    } else {
        PathBuf::from("dashboard.toml")
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    /// Fixed offset of the chain's local time, in minutes east of UTC.
    /// Used to default missing dates to "today".
    pub timezone_offset_minutes: i32,
    pub warehouse: SourceSettings,
    pub sales: SourceSettings,
    pub booking_api: BookingApiSettings,
    pub departments: Vec<DepartmentEntry>,
    pub auth: AuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
            timezone_offset_minutes: DEFAULT_TIMEZONE_OFFSET_MINUTES,
            warehouse: SourceSettings::default(),
            sales: SourceSettings::default(),
            booking_api: BookingApiSettings::default(),
            departments: Vec::new(),
            auth: AuthSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
    /// Directory holding the dashboard page served at `/`.
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// A DuckDB-backed data source.
///
/// `init_sql` runs on every freshly opened connection, which is where real
/// deployments `ATTACH` the upstream database and define the views the
/// queries expect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Database file; in-memory when unset.
    pub path: Option<PathBuf>,
    pub init_sql: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    /// Each request paces its own upstream calls.
    #[default]
    Request,
    /// All requests share one pacer.
    Process,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingApiSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two upstream calls.
    pub min_interval_ms: u64,
    /// Rolling cap for range scans: at most this many calls per window.
    pub window_max_requests: u32,
    pub window_secs: u64,
    /// Longest range, in days, a live range scan accepts.
    pub max_live_range_days: i64,
    pub rate_limit_scope: RateLimitScope,
    /// Booking-system ids to scan live; every department id when empty.
    pub live_locations: Vec<String>,
}

impl Default for BookingApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.dinnerbooking.com/api/v1".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 30,
            min_interval_ms: 1000,
            window_max_requests: 60,
            window_secs: 60,
            max_live_range_days: 7,
            rate_limit_scope: RateLimitScope::Request,
            live_locations: Vec::new(),
        }
    }
}

impl BookingApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// One physical restaurant: booking-system id, canonical display name and
/// the free-text spellings other sources use for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Shared password for every dashboard user. Empty disables the gate.
    pub password: String,
    /// Username to scope: `admin` or a department name.
    pub users: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Settings {
    /// Load settings from a TOML file, layered over defaults and under
    /// `DASHBOARD__*` environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::layered(path, true)
    }

    /// Load from `path` when given (it must exist), otherwise from
    /// [`default_config_path`] if present, falling back to defaults and
    /// environment only.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::layered(p, true),
            None => Self::layered(&default_config_path(), false),
        }
    }

    fn layered(path: &Path, required: bool) -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::finish(builder)
    }

    /// Load settings from an in-memory TOML document (no environment layer).
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(ConfigBuilder::<DefaultState>::default()
            .set_default("server.address", DEFAULT_ADDR)?
            .set_default("logging.level", "info")?
            .set_default("timezone_offset_minutes", DEFAULT_TIMEZONE_OFFSET_MINUTES)?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.timezone_offset_minutes.abs() > 14 * 60 {
            return Err(DashboardError::InvalidArgument(format!(
                "timezone_offset_minutes {} is outside +/-14h",
                self.timezone_offset_minutes
            )));
        }
        let api = &self.booking_api;
        if api.max_live_range_days < 1 {
            return Err(DashboardError::InvalidArgument(
                "booking_api.max_live_range_days must be at least 1".into(),
            ));
        }
        if api.window_max_requests == 0 || api.window_secs == 0 {
            return Err(DashboardError::InvalidArgument(
                "booking_api.window_max_requests and window_secs must be positive".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(DashboardError::InvalidArgument(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for dept in &self.departments {
            if !seen.insert(dept.id.as_str()) {
                return Err(DashboardError::InvalidArgument(format!(
                    "duplicate department id '{}'",
                    dept.id
                )));
            }
        }
        Ok(())
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> std::result::Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
