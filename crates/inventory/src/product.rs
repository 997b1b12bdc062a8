use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, DomainResult, Entity, Sku, StockKey, WarehouseId};

/// Fallback values applied when a product or a ledger-created row leaves a
/// field unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDefaults {
    pub category: String,
    pub unit_of_measure: String,
    pub warehouse: WarehouseId,
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            category: "Uncategorized".to_string(),
            unit_of_measure: "pcs".to_string(),
            warehouse: WarehouseId::default(),
        }
    }
}

/// One stock-keeping unit at one warehouse.
///
/// `quantity` is unsigned, so the non-negativity invariant holds by
/// construction; it only changes through [`crate::StockSnapshot::change_stock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    sku: Sku,
    name: String,
    category: String,
    unit_of_measure: String,
    quantity: u64,
    warehouse: WarehouseId,
    reorder_threshold: u64,
}

/// Coarse stock level used by dashboards and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    OutOfStock,
}

impl Product {
    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn unit_of_measure(&self) -> &str {
        &self.unit_of_measure
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn warehouse(&self) -> &WarehouseId {
        &self.warehouse
    }

    pub fn reorder_threshold(&self) -> u64 {
        self.reorder_threshold
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.sku.clone(), self.warehouse.clone())
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    pub fn stock_status(&self) -> StockStatus {
        if self.quantity == 0 {
            StockStatus::OutOfStock
        } else if self.is_low_stock() {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Same metadata, different warehouse and quantity (transfer destination rows).
    pub fn clone_to(&self, warehouse: WarehouseId, quantity: u64) -> Self {
        Self {
            warehouse,
            quantity,
            ..self.clone()
        }
    }

    /// A row created by a stock count for a SKU with no row at that warehouse.
    pub fn counted(sku: Sku, warehouse: WarehouseId, quantity: u64, defaults: &ProductDefaults) -> Self {
        Self {
            name: sku.to_string(),
            sku,
            category: defaults.category.clone(),
            unit_of_measure: defaults.unit_of_measure.clone(),
            quantity,
            warehouse,
            reorder_threshold: 0,
        }
    }

    pub(crate) fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
    }

    /// Merge the metadata fields of a patch. Quantity is handled separately by
    /// the stock primitive.
    pub(crate) fn merge_metadata(&mut self, patch: &ProductPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            self.name = required_text("name", name)?;
        }
        if let Some(category) = &patch.category {
            self.category = required_text("category", category)?;
        }
        if let Some(uom) = &patch.unit_of_measure {
            self.unit_of_measure = required_text("unit of measure", uom)?;
        }
        if let Some(reorder) = patch.reorder_threshold {
            self.reorder_threshold = non_negative("reorder threshold", reorder)?;
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = StockKey;

    fn id(&self) -> Self::Id {
        self.key()
    }
}

/// Input for explicit product creation (raw form values).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub reorder_threshold: Option<i64>,
}

impl NewProduct {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_unit_of_measure(mut self, uom: impl Into<String>) -> Self {
        self.unit_of_measure = Some(uom.into());
        self
    }

    pub fn with_reorder_threshold(mut self, reorder: i64) -> Self {
        self.reorder_threshold = Some(reorder);
        self
    }

    /// Validate and fill in defaults. Blank optional text counts as absent.
    pub fn into_product(self, defaults: &ProductDefaults) -> DomainResult<Product> {
        let sku = Sku::new(&self.sku)?;
        let name = required_text("name", &self.name)?;
        let warehouse = match blank_to_none(self.warehouse) {
            Some(w) => WarehouseId::new(w)?,
            None => defaults.warehouse.clone(),
        };

        Ok(Product {
            sku,
            name,
            category: blank_to_none(self.category).unwrap_or_else(|| defaults.category.clone()),
            unit_of_measure: blank_to_none(self.unit_of_measure)
                .unwrap_or_else(|| defaults.unit_of_measure.clone()),
            quantity: non_negative("quantity", self.quantity.unwrap_or(0))?,
            warehouse,
            reorder_threshold: non_negative("reorder threshold", self.reorder_threshold.unwrap_or(0))?,
        })
    }
}

/// Partial update of a product row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub reorder_threshold: Option<i64>,
}

impl ProductPatch {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Coerce a requested quantity against the stored one.
///
/// Negative requests collapse to the stored value; the flag reports whether
/// coercion happened so callers can surface it.
pub fn coerce_quantity(requested: i64, stored: u64) -> (u64, bool) {
    match u64::try_from(requested) {
        Ok(q) => (q, false),
        Err(_) => (stored, true),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn non_negative(field: &str, value: i64) -> DomainResult<u64> {
    u64::try_from(value)
        .map_err(|_| DomainError::invalid_input(format!("{field} cannot be negative (got {value})")))
}
