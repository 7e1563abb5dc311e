use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::meta::MemoryStore;

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub slot_name: String,
    pub timestamp: u64,
    pub store: MemoryStore,
}

fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{}.json", slot))
}

pub fn save_to_file(dir: &Path, slot: &str, data: &SaveData) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create save directory: {e}"))?;
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize save data: {e}"))?;
    fs::write(save_path(dir, slot), json).map_err(|e| format!("Failed to write save file: {e}"))?;
    Ok(())
}

pub fn load_from_file(dir: &Path, slot: &str) -> Result<SaveData, String> {
    let json = fs::read_to_string(save_path(dir, slot))
        .map_err(|e| format!("Failed to read save file: {e}"))?;
    serde_json::from_str(&json).map_err(|e| format!("Failed to parse save data: {e}"))
}

/// Load a slot, starting fresh when it is missing or unreadable.
pub fn load_or_default(dir: &Path, slot: &str) -> SaveData {
    if !save_path(dir, slot).exists() {
        return SaveData {
            slot_name: slot.to_string(),
            ..SaveData::default()
        };
    }
    match load_from_file(dir, slot) {
        Ok(data) => data,
        Err(e) => {
            warn!("{}; starting with empty progress", e);
            SaveData {
                slot_name: slot.to_string(),
                ..SaveData::default()
            }
        }
    }
}

pub fn delete_save(dir: &Path, slot: &str) -> Result<(), String> {
    let path = save_path(dir, slot);
    if path.exists() {
        fs::remove_file(&path).map_err(|e| format!("Failed to delete save file: {e}"))?;
    }
    Ok(())
}
