use std::path::Path;

use anyhow::Result;

use crate::core::AppConfig;
use crate::presentation::{SlotConfig, build_slots};

pub fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let slot_config = SlotConfig::load(Path::new(&config.slot_config_path));
    for slot in build_slots(&slot_config) {
        println!("{:>4} {:>4}  {}", slot.start_minutes, slot.end_minutes, slot.label);
    }
    Ok(())
}
