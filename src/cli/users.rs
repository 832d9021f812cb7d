use std::path::Path;

use anyhow::Result;

use crate::calendar::load_monitored_users;
use crate::core::AppConfig;

pub fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let users = load_monitored_users(Path::new(&config.users_config_path))?;
    println!("{}", serde_json::to_string_pretty(&users)?);
    Ok(())
}
