use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::client::ClientConfig;

/// Control panel for web, desktop and document automation jobs.
#[derive(Debug, Parser)]
#[command(name = "automation-panel", version, about)]
pub struct PanelArgs {
    /// Base address of the automation backend.
    #[arg(long, env = "AUTOMATION_API_URL", default_value = "http://localhost:8000")]
    pub api_url: Url,

    /// Per-request timeout in seconds; 0 waits indefinitely.
    #[arg(long, env = "AUTOMATION_API_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log filter, e.g. `automation_panel=debug`. Overrides RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,
}

impl PanelArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}
