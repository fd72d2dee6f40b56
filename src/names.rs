use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Display names keyed by rom stem, from `resources/name.json` and `user_config/name_extra.json`.
#[derive(Debug)]
pub struct NamesProvider {
    base_file: PathBuf,
    extra_file: PathBuf,
    names: OnceLock<BTreeMap<String, String>>,
}

impl NamesProvider {
    pub fn new(base_file: impl Into<PathBuf>, extra_file: impl Into<PathBuf>) -> Self {
        Self {
            base_file: base_file.into(),
            extra_file: extra_file.into(),
            names: OnceLock::new(),
        }
    }

    /// Provider over an in-memory table.
    pub fn from_map(names: BTreeMap<String, String>) -> Self {
        let lock = OnceLock::new();
        let _ = lock.set(names);
        Self {
            base_file: PathBuf::new(),
            extra_file: PathBuf::new(),
            names: lock,
        }
    }

    pub fn names(&self) -> &BTreeMap<String, String> {
        self.names.get_or_init(|| {
            let mut combined = read_table(&self.extra_file);
            // The base table wins on duplicate keys.
            combined.extend(read_table(&self.base_file));
            combined
        })
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.names().get(key).map(String::as_str)
    }

    pub fn extra_entries(&self) -> BTreeMap<String, String> {
        read_table(&self.extra_file)
    }

    pub fn has_extra_entries(&self) -> bool {
        !self.extra_entries().is_empty()
    }

    /// Stems with a display name, sorted by that name (ties by stem).
    pub fn ordered_list<'a>(&self, stems: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let names = self.names();
        let mut relevant: Vec<(&str, &str)> = stems
            .into_iter()
            .filter_map(|stem| names.get(stem).map(|n| (n.as_str(), stem)))
            .collect();
        relevant.sort();
        relevant.dedup();
        relevant.into_iter().map(|(_, stem)| stem.to_string()).collect()
    }
}

fn read_table(path: &Path) -> BTreeMap<String, String> {
    if path.as_os_str().is_empty() || !path.exists() {
        return BTreeMap::new();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| {
            serde_json::from_str::<BTreeMap<String, String>>(&raw).map_err(|e| e.to_string())
        });
    match parsed {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "cannot read names table");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/names.rs"]
mod tests;
