use std::env;

use anyhow::Result;

use crate::api;
use crate::core::AppConfig;

pub async fn run(host: String, port: String) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    // The web tier calls back into this same server unless told otherwise
    if env::var("CALTRACK_API_URL").is_err() {
        config.api_base_url = format!("http://{}:{}", host, port);
    }
    api::serve(host, port, config).await
}
