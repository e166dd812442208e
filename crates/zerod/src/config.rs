//! Worker configuration loading

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;
use zeroworker::WorkerConfig;

/// Load the worker config from `path` (or defaults) and scope it to `origin`
pub fn load_worker_config(path: Option<&Path>, origin: &str) -> Result<WorkerConfig> {
    let origin = parse_origin(origin)?;

    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .context(format!("Failed to read worker config: {:?}", path))?;
            info!("Loaded worker config from {:?}", path);
            WorkerConfig::from_json(&json)?
        }
        None => WorkerConfig::default(),
    };

    Ok(config.with_scope(origin))
}

/// Parse the upstream origin, making sure it ends in `/` so relative
/// manifest paths resolve beneath it
fn parse_origin(origin: &str) -> Result<Url> {
    let mut url = Url::parse(origin).context(format!("Invalid origin URL: {}", origin))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
