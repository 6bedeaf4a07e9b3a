// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::Error;
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

/// YAML load/save for any serde type. Writes are whole-file and
/// idempotent by path: identical inputs produce identical bytes.
pub trait PersistableConfig: Serialize + DeserializeOwned {
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::IO(path.display().to_string(), e))?;
        Self::parse(&contents).map_err(|e| match e {
            Error::Yaml(_, source) => Error::Yaml(path.display().to_string(), source),
            other => other,
        })
    }

    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::IO(parent.display().to_string(), e))?;
        }
        let contents = serde_yaml::to_string(self)
            .map_err(|e| Error::Yaml(path.display().to_string(), e))?;
        fs::write(path, contents).map_err(|e| Error::IO(path.display().to_string(), e))
    }

    fn parse(serialized: &str) -> Result<Self, Error> {
        serde_yaml::from_str(serialized).map_err(|e| Error::Yaml("input".into(), e))
    }
}

impl<T: Serialize + DeserializeOwned> PersistableConfig for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Sample {
        name: String,
        count: u64,
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.yml");
        let sample = Sample {
            name: "node-0".into(),
            count: 3,
        };
        sample.save_config(&path).unwrap();
        assert_eq!(Sample::load_config(&path).unwrap(), sample);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = Sample::load_config("/nonexistent/sample.yml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sample.yml"));
    }
}
