use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Pawbook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port for the storefront API
pub const DEFAULT_PORT: u16 = 8420;

/// Get the application data directory
/// ~/Pawbook/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Pawbook")
}

/// Get the SQLite database path, honouring the PAWBOOK_DB override
pub fn database_path() -> PathBuf {
    match std::env::var("PAWBOOK_DB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => app_data_dir().join("pawbook.db"),
    }
}

/// Bind address for the API server; PAWBOOK_PORT overrides the port
pub fn server_addr() -> SocketAddr {
    let port = std::env::var("PAWBOOK_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    "pawbook=info,tower_http=warn".to_string()
}
