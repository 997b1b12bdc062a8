//! In-memory view of every product row, and the single stock primitive.

use stockmaster_core::{DomainError, DomainResult, Sku, WarehouseId};

use crate::product::{Product, ProductPatch, coerce_quantity};

/// Ordered set of product rows (newest first).
///
/// A snapshot is loaded from storage, mutated, and written back as a whole;
/// the ledger mutates a clone and discards it on failure, which is what makes
/// multi-item validation all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSnapshot {
    rows: Vec<Product>,
}

/// Result of applying a patch: the updated row and whether a negative
/// quantity was coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub product: Product,
    pub quantity_coerced: bool,
}

impl StockSnapshot {
    pub fn new(rows: Vec<Product>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Product] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Product> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for `sku` in any warehouse.
    pub fn find(&self, sku: &Sku) -> Option<&Product> {
        self.position(sku, None).map(|idx| &self.rows[idx])
    }

    /// The row for the exact `(sku, warehouse)` pair.
    pub fn find_at(&self, sku: &Sku, warehouse: &WarehouseId) -> Option<&Product> {
        self.position(sku, Some(warehouse)).map(|idx| &self.rows[idx])
    }

    pub fn contains_sku(&self, sku: &Sku) -> bool {
        self.rows.iter().any(|p| p.sku() == sku)
    }

    /// On-hand quantity for the pair; zero when no row exists.
    pub fn available(&self, sku: &Sku, warehouse: &WarehouseId) -> u64 {
        self.find_at(sku, warehouse).map(Product::quantity).unwrap_or(0)
    }

    /// Sum of `sku` across every warehouse.
    pub fn total_quantity(&self, sku: &Sku) -> u64 {
        self.rows
            .iter()
            .filter(|p| p.sku() == sku)
            .map(Product::quantity)
            .sum()
    }

    pub fn low_stock(&self) -> impl Iterator<Item = &Product> {
        self.rows.iter().filter(|p| p.is_low_stock())
    }

    /// Apply `delta` to the `(sku, warehouse)` row, or the first `sku` row
    /// when `warehouse` is `None`.
    ///
    /// Fails without touching the row when the result would be negative.
    pub fn change_stock(
        &mut self,
        sku: &Sku,
        delta: i64,
        warehouse: Option<&WarehouseId>,
    ) -> DomainResult<&Product> {
        let idx = self.position(sku, warehouse).ok_or_else(|| {
            let key = match warehouse {
                Some(w) => format!("{sku}@{w}"),
                None => sku.to_string(),
            };
            DomainError::not_found("product", key)
        })?;

        let row = &mut self.rows[idx];
        let current = row.quantity();
        let next = if delta >= 0 {
            current.checked_add(delta.unsigned_abs()).ok_or_else(|| {
                DomainError::invalid_input(format!("quantity overflow for {}", row.key()))
            })?
        } else {
            let decrease = delta.unsigned_abs();
            current
                .checked_sub(decrease)
                .ok_or_else(|| DomainError::InsufficientStock {
                    sku: sku.to_string(),
                    warehouse: row.warehouse().to_string(),
                    available: current,
                    requested: decrease,
                })?
        };

        row.set_quantity(next);
        Ok(&self.rows[idx])
    }

    /// Set the row to an absolute quantity, expressed as a delta through
    /// [`Self::change_stock`].
    pub fn set_stock(
        &mut self,
        sku: &Sku,
        quantity: u64,
        warehouse: Option<&WarehouseId>,
    ) -> DomainResult<&Product> {
        let current = self
            .position(sku, warehouse)
            .map(|idx| self.rows[idx].quantity())
            .unwrap_or(0);
        let delta = signed_delta(current, quantity)?;
        self.change_stock(sku, delta, warehouse)
    }

    /// Insert a new row at the head. Only the `(sku, warehouse)` pair must be
    /// unused.
    pub fn insert(&mut self, product: Product) -> DomainResult<&Product> {
        if self.find_at(product.sku(), product.warehouse()).is_some() {
            return Err(DomainError::duplicate_sku(product.key().to_string()));
        }
        self.rows.insert(0, product);
        Ok(&self.rows[0])
    }

    /// Explicit product creation: the SKU must be unused in every warehouse.
    pub fn create(&mut self, product: Product) -> DomainResult<&Product> {
        if self.contains_sku(product.sku()) {
            return Err(DomainError::duplicate_sku(product.sku().to_string()));
        }
        self.insert(product)
    }

    /// Merge a partial update into one row.
    ///
    /// Metadata is merged directly; a quantity is coerced to a non-negative
    /// value and then applied through [`Self::set_stock`].
    pub fn patch(
        &mut self,
        sku: &Sku,
        warehouse: Option<&WarehouseId>,
        patch: &ProductPatch,
    ) -> DomainResult<PatchReport> {
        let idx = self
            .position(sku, warehouse)
            .ok_or_else(|| DomainError::not_found("product", sku.to_string()))?;

        let mut updated = self.rows[idx].clone();
        updated.merge_metadata(patch)?;

        let mut quantity_coerced = false;
        if let Some(requested) = patch.quantity {
            let (quantity, coerced) = coerce_quantity(requested, updated.quantity());
            quantity_coerced = coerced;
            let row_warehouse = updated.warehouse().clone();
            self.rows[idx] = updated;
            self.set_stock(sku, quantity, Some(&row_warehouse))?;
        } else {
            self.rows[idx] = updated;
        }

        Ok(PatchReport {
            product: self.rows[idx].clone(),
            quantity_coerced,
        })
    }

    fn position(&self, sku: &Sku, warehouse: Option<&WarehouseId>) -> Option<usize> {
        self.rows
            .iter()
            .position(|p| p.sku() == sku && warehouse.is_none_or(|w| p.warehouse() == w))
    }
}

fn signed_delta(current: u64, target: u64) -> DomainResult<i64> {
    let overflow = || DomainError::invalid_input(format!("quantity {target} out of range"));
    if target >= current {
        i64::try_from(target - current).map_err(|_| overflow())
    } else {
        i64::try_from(current - target).map(|d| -d).map_err(|_| overflow())
    }
}
