//! Configuration file and recipe snapshots
//!
//! ```toml
//! table = "recipes.xlsx"
//! special_items = ["Crystal", "Gold"]
//! special_label = "Crystals"
//!
//! [suggestions]
//! limit = 5
//! cutoff = 0.5
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::catalog::RecipeCatalog;
use crate::error::ConfigError;
use crate::suggest;
use crate::table;

pub const DEFAULT_CONFIG_PATH: &str = "recipe-researcher.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Recipe table: csv/xlsx/xls file, directory of sheets, or SQLite database
    pub table: PathBuf,

    /// Leaf materials listed separately in results
    pub special_items: BTreeSet<String>,

    /// Heading for the special materials section
    pub special_label: String,

    pub suggestions: SuggestionSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: PathBuf::from("recipes.csv"),
            special_items: BTreeSet::new(),
            special_label: "Special materials".to_string(),
            suggestions: SuggestionSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestionSection {
    pub limit: usize,
    pub cutoff: f64,
}

impl Default for SuggestionSection {
    fn default() -> Self {
        Self {
            limit: suggest::DEFAULT_LIMIT,
            cutoff: suggest::DEFAULT_CUTOFF,
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Everything one calculation reads, frozen for its whole duration
#[derive(Debug, Default)]
pub struct Snapshot {
    pub config: Arc<Config>,
    pub catalog: Arc<RecipeCatalog>,
}

impl Snapshot {
    /// Load config, then the recipe table it names (or `table_override`)
    pub fn load(config_path: &Path, table_override: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::load(config_path)?;
        if let Some(table) = table_override {
            config.table = table.to_path_buf();
        }
        let catalog = table::load_catalog(&config.table);
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        })
    }
}

/// Shared holder that swaps whole snapshots on reload
///
/// Readers clone the current `Arc<Snapshot>` and keep using it even if a
/// reload publishes a newer one meanwhile.
#[derive(Debug)]
pub struct SnapshotStore {
    config_path: PathBuf,
    table_override: Option<PathBuf>,
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(config_path: PathBuf, table_override: Option<PathBuf>) -> Self {
        Self {
            config_path,
            table_override,
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Build a fresh snapshot from disk and publish it
    pub fn reload(&self) -> Result<Arc<Snapshot>, ConfigError> {
        let snapshot = Arc::new(Snapshot::load(&self.config_path, self.table_override.as_deref())?);
        self.publish(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, RecipeRow};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            table = "data/recipes.xlsx"
            special_items = ["Crystal", "Gold"]
            special_label = "Crystals"

            [suggestions]
            limit = 3
            cutoff = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.table, PathBuf::from("data/recipes.xlsx"));
        assert!(config.special_items.contains("Crystal"));
        assert_eq!(config.special_label, "Crystals");
        assert_eq!(config.suggestions, SuggestionSection { limit: 3, cutoff: 0.7 });
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("special_items = [\"Gem\"]").unwrap();
        assert_eq!(config.table, PathBuf::from("recipes.csv"));
        assert_eq!(config.suggestions, SuggestionSection::default());
    }

    #[test]
    fn test_missing_file_is_default_and_bad_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(&dir.path().join("absent.toml")).unwrap(), Config::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "special_items = 42").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_reload_swaps_without_disturbing_readers() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("recipes.csv");
        let config_path = dir.path().join("config.toml");
        let config = format!("table = {:?}\nspecial_items = [\"Crystal\"]\n", table);
        std::fs::write(&config_path, config).unwrap();
        std::fs::write(
            &table,
            "output_item,yield_per_batch,material_slot_1,required_qty_slot_1\nSword,1,Ingot,3\n",
        )
        .unwrap();

        let store = SnapshotStore::new(config_path, None);
        assert!(store.current().catalog.is_empty());

        let first = store.reload().unwrap();
        assert!(first.catalog.is_craftable("Sword"));

        std::fs::write(
            &table,
            "output_item,yield_per_batch,material_slot_1,required_qty_slot_1\nShield,1,Plank,2\n",
        )
        .unwrap();
        store.reload().unwrap();

        // The old snapshot is untouched, new readers see the new table
        assert!(first.catalog.is_craftable("Sword"));
        assert!(!first.catalog.is_craftable("Shield"));
        assert!(store.current().catalog.is_craftable("Shield"));
        assert!(store.current().config.special_items.contains("Crystal"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(SnapshotStore::new(PathBuf::from("unused.toml"), None));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = store.current();
                        // Either the empty initial snapshot or the complete published one
                        let len = snapshot.catalog.len();
                        assert!(len == 0 || len == 2);
                    }
                })
            })
            .collect();

        for _ in 0..50 {
            store.publish(Arc::new(Snapshot {
                config: Arc::new(Config::default()),
                catalog: Arc::new(RecipeCatalog::from_rows(vec![
                    RecipeRow::new("Sword", 1, vec![Ingredient::new("Ingot", 3.0)]),
                    RecipeRow::new("Ingot", 2, vec![Ingredient::new("Ore", 5.0)]),
                ])),
            }));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_table_override_wins() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("other.csv");
        std::fs::write(
            &table,
            "output_item,yield_per_batch,material_slot_1,required_qty_slot_1\nBow,1,Wood,3\n",
        )
        .unwrap();

        let snapshot = Snapshot::load(&dir.path().join("absent.toml"), Some(&table)).unwrap();
        assert_eq!(snapshot.config.table, table);
        assert!(snapshot.catalog.is_craftable("Bow"));
    }
}
