use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;

/// Test names excluded from a conformance run.
///
/// The set reflects the target deployment's feature configuration, not the
/// runner's algorithm, so it is configuration: loaded from a TOML file or
/// built in code, never baked into the library. Denylisted cases are skipped
/// outright: no assertions, no failpoint activity, not counted as pass or
/// fail.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    names: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct DenylistFile {
    denylist: DenylistSection,
}

#[derive(Debug, Deserialize)]
struct DenylistSection {
    names: Vec<String>,
}

impl Denylist {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load from a TOML file with a `[denylist] names = [...]` table.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: DenylistFile = toml::from_str(contents)?;
        Ok(Self::new(file.denylist.names))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order, for audit output.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
