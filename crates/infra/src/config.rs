//! Runtime configuration, read from `STOCKMASTER_*` environment variables.

use std::path::PathBuf;

use stockmaster_core::WarehouseId;
use stockmaster_inventory::ProductDefaults;

pub const DATA_DIR_VAR: &str = "STOCKMASTER_DATA_DIR";
pub const DEFAULT_WAREHOUSE_VAR: &str = "STOCKMASTER_DEFAULT_WAREHOUSE";
pub const DEFAULT_CATEGORY_VAR: &str = "STOCKMASTER_DEFAULT_CATEGORY";
pub const DEFAULT_UOM_VAR: &str = "STOCKMASTER_DEFAULT_UOM";
pub const SEED_DEMO_VAR: &str = "STOCKMASTER_SEED_DEMO";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// JSON-file backend directory; `None` selects the in-memory backend.
    pub data_dir: Option<PathBuf>,
    pub defaults: ProductDefaults,
    /// Seed demo data when the store is empty on open.
    pub seed_demo: bool,
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset; invalid
    /// values fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        match get(DATA_DIR_VAR) {
            Some(dir) => config.data_dir = Some(PathBuf::from(dir)),
            None => tracing::debug!("{DATA_DIR_VAR} not set; using in-memory persistence"),
        }

        if let Some(raw) = get(DEFAULT_WAREHOUSE_VAR) {
            match WarehouseId::new(&raw) {
                Ok(warehouse) => config.defaults.warehouse = warehouse,
                Err(err) => tracing::warn!("{DEFAULT_WAREHOUSE_VAR}={raw:?} ignored: {err}"),
            }
        }
        if let Some(category) = get(DEFAULT_CATEGORY_VAR) {
            config.defaults.category = category;
        }
        if let Some(uom) = get(DEFAULT_UOM_VAR) {
            config.defaults.unit_of_measure = uom;
        }

        if let Some(raw) = get(SEED_DEMO_VAR) {
            config.seed_demo = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    tracing::warn!("{SEED_DEMO_VAR}={raw:?} not understood; demo seeding disabled");
                    false
                }
            };
        }

        config
    }
}
