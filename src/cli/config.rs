// File: config.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Build parameters stored next to a checkpoint as `<database>.toml`.

use std::path::Path;

use toml::map::Map;

use crate::error::{Result, SearchError};
use crate::index::database::CHECKPOINT_VERSION;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub format_version: u32,
    pub window_size: usize,
    pub intra_chain: bool,
    pub atom_name: String,
    pub num_entries: usize,
}

impl DatabaseConfig {
    pub fn new(window_size: usize, intra_chain: bool, atom_name: &str, num_entries: usize) -> Self {
        Self {
            format_version: CHECKPOINT_VERSION,
            window_size,
            intra_chain,
            atom_name: atom_name.to_string(),
            num_entries,
        }
    }

    pub fn from_toml(toml: &toml::Value, path: &Path) -> Result<Self> {
        let invalid = |key: &str| SearchError::checkpoint(path, format!("missing or invalid '{}' in database config", key));
        let format_version = toml.get("format_version").and_then(|x| x.as_integer()).ok_or_else(|| invalid("format_version"))?;
        let window_size = toml.get("window_size").and_then(|x| x.as_integer()).ok_or_else(|| invalid("window_size"))?;
        let intra_chain = toml.get("intra_chain").and_then(|x| x.as_bool()).ok_or_else(|| invalid("intra_chain"))?;
        let atom_name = toml.get("atom_name").and_then(|x| x.as_str()).ok_or_else(|| invalid("atom_name"))?;
        let num_entries = toml.get("num_entries").and_then(|x| x.as_integer()).ok_or_else(|| invalid("num_entries"))?;
        Ok(Self {
            format_version: u32::try_from(format_version).map_err(|_| invalid("format_version"))?,
            window_size: usize::try_from(window_size).map_err(|_| invalid("window_size"))?,
            intra_chain,
            atom_name: atom_name.to_string(),
            num_entries: usize::try_from(num_entries).map_err(|_| invalid("num_entries"))?,
        })
    }

    pub fn to_toml(&self) -> toml::Value {
        let mut map = Map::new();
        map.insert("format_version".to_string(), toml::Value::Integer(self.format_version as i64));
        map.insert("window_size".to_string(), toml::Value::Integer(self.window_size as i64));
        map.insert("intra_chain".to_string(), toml::Value::Boolean(self.intra_chain));
        map.insert("atom_name".to_string(), toml::Value::String(self.atom_name.clone()));
        map.insert("num_entries".to_string(), toml::Value::Integer(self.num_entries as i64));
        toml::Value::Table(map)
    }
}

/// Sidecar path for a checkpoint, e.g. `db/pdb.dmdb` -> `db/pdb.dmdb.toml`.
pub fn config_path(database_path: &str) -> String {
    format!("{}.toml", database_path)
}

pub fn write_database_config_to_file(path: &str, config: &DatabaseConfig) -> Result<()> {
    let text = toml::to_string(&config.to_toml())
        .map_err(|e| SearchError::checkpoint(path, format!("cannot serialize database config: {}", e)))?;
    std::fs::write(path, text).map_err(|e| SearchError::io(path, e))
}

pub fn read_database_config_from_file(path: &str) -> Result<DatabaseConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| SearchError::io(path, e))?;
    let toml: toml::Value = toml::from_str(&text)
        .map_err(|e| SearchError::checkpoint(path, format!("invalid database config: {}", e)))?;
    DatabaseConfig::from_toml(&toml, Path::new(path))
}
