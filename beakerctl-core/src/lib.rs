pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod sessions;

pub use config::{parse_timeout, resolve_config, ResolvedConfig, DEFAULT_PREFIX, DEFAULT_TABLE_NAME};
pub use db::create_pool;
pub use error::BeakerctlError;
pub use models::session::{SessionMapping, SessionRow, SessionValue, RESERVED_TIME_KEYS};
pub use report::render_report;
pub use sessions::{cleanup_sessions, read_sessions, session_mapping};
