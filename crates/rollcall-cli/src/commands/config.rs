use rollcall_core::config::{default_config_path, ClientConfig};

use crate::cli::ConfigCommands;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(),
        ConfigCommands::Init {
            server_url,
            timeout_secs,
            scan_window_ms,
        } => run_config_init(server_url, timeout_secs, scan_window_ms),
    }
}

fn run_config_show() -> Result<(), CliError> {
    let config = ClientConfig::load()?;
    println!("Config file:      {}", default_config_path().display());
    println!("Server URL:       {}", config.server_url());
    println!("Request timeout:  {}s", config.request_timeout().as_secs());
    println!(
        "Scan quiet window: {}ms",
        config.scan_quiet_window().as_millis()
    );
    Ok(())
}

pub fn run_config_init(
    server_url: Option<String>,
    timeout_secs: Option<u64>,
    scan_window_ms: Option<u64>,
) -> Result<(), CliError> {
    let path = default_config_path();
    let config = merge_config(
        ClientConfig::load_from_path(&path)?,
        server_url,
        timeout_secs,
        scan_window_ms,
    );
    config.save_to_path(&path)?;
    println!("Saved config to {}", path.display());
    Ok(())
}

/// Overlay explicitly passed values on an existing config.
pub fn merge_config(
    mut config: ClientConfig,
    server_url: Option<String>,
    timeout_secs: Option<u64>,
    scan_window_ms: Option<u64>,
) -> ClientConfig {
    if server_url.is_some() {
        config.server_url = server_url;
    }
    if timeout_secs.is_some() {
        config.request_timeout_secs = timeout_secs;
    }
    if scan_window_ms.is_some() {
        config.scan_quiet_window_ms = scan_window_ms;
    }
    config
}
