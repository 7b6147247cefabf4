use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

/// Opens and deserializes a YAML file. `kind` names the file in errors.
pub fn read_yaml<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))?;
    serde_yaml::from_reader(file)
        .map_err(|e| anyhow!("Parsing {} file `{}`: {}", kind, path.display(), e))
}
