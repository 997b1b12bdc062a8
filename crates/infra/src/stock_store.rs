//! Stock Store: product rows and the single quantity primitive.

use stockmaster_core::{Sku, WarehouseId};
use stockmaster_inventory::{
    NewProduct, PatchReport, Product, ProductDefaults, ProductPatch, StockSnapshot,
};

use crate::backing::{Backing, encode};
use crate::error::LedgerError;
use crate::persistence::{Collection, PersistencePort};

/// Owns the `products` collection.
///
/// Every mutation is a read-modify-write of the whole collection under the
/// shared writer gate.
#[derive(Debug)]
pub struct StockStore<P> {
    backing: Backing<P>,
    defaults: ProductDefaults,
}

impl<P> Clone for StockStore<P> {
    fn clone(&self) -> Self {
        Self {
            backing: self.backing.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<P: PersistencePort> StockStore<P> {
    pub fn new(backing: Backing<P>, defaults: ProductDefaults) -> Self {
        Self { backing, defaults }
    }

    pub fn backing(&self) -> &Backing<P> {
        &self.backing
    }

    pub fn defaults(&self) -> &ProductDefaults {
        &self.defaults
    }

    /// Current committed rows.
    pub fn snapshot(&self) -> Result<StockSnapshot, LedgerError> {
        let rows: Vec<Product> = self.backing.load(Collection::Products)?;
        tracing::debug!(rows = rows.len(), "loaded products");
        Ok(StockSnapshot::new(rows))
    }

    pub fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        Ok(self.snapshot()?.into_rows())
    }

    /// First row for `sku`, in any warehouse.
    pub fn find_product(&self, sku: &Sku) -> Result<Option<Product>, LedgerError> {
        Ok(self.snapshot()?.find(sku).cloned())
    }

    pub fn find_product_at(&self, sku: &Sku, warehouse: &WarehouseId) -> Result<Option<Product>, LedgerError> {
        Ok(self.snapshot()?.find_at(sku, warehouse).cloned())
    }

    /// On-hand quantity of the pair; zero when there is no row.
    pub fn available(&self, sku: &Sku, warehouse: &WarehouseId) -> Result<u64, LedgerError> {
        Ok(self.snapshot()?.available(sku, warehouse))
    }

    pub fn low_stock(&self) -> Result<Vec<Product>, LedgerError> {
        Ok(self.snapshot()?.low_stock().cloned().collect())
    }

    /// Create a product. The SKU must not exist in any warehouse.
    pub fn create_product(&self, new: NewProduct) -> Result<Product, LedgerError> {
        let product = new.into_product(&self.defaults)?;

        let _guard = self.backing.lock()?;
        let mut stock = self.snapshot()?;
        let created = stock.create(product)?.clone();
        self.store(&stock)?;

        tracing::info!(sku = %created.sku(), warehouse = %created.warehouse(), quantity = created.quantity(), "product created");
        Ok(created)
    }

    /// Merge a partial update into the `(sku, warehouse)` row, or the first
    /// `sku` row when no warehouse is given.
    pub fn update_product(
        &self,
        sku: &Sku,
        warehouse: Option<&WarehouseId>,
        patch: &ProductPatch,
    ) -> Result<PatchReport, LedgerError> {
        let _guard = self.backing.lock()?;
        let mut stock = self.snapshot()?;
        let report = stock.patch(sku, warehouse, patch)?;
        self.store(&stock)?;

        if report.quantity_coerced {
            tracing::warn!(
                sku = %sku,
                requested = ?patch.quantity,
                kept = report.product.quantity(),
                "negative quantity in product update coerced to stored value"
            );
        }
        tracing::debug!(key = %report.product.key(), "product updated");
        Ok(report)
    }

    /// Apply `delta` to one row and persist it. Fails without effect when the
    /// result would be negative.
    pub fn change_stock(
        &self,
        sku: &Sku,
        delta: i64,
        warehouse: Option<&WarehouseId>,
    ) -> Result<Product, LedgerError> {
        let _guard = self.backing.lock()?;
        let mut stock = self.snapshot()?;
        let updated = match stock.change_stock(sku, delta, warehouse) {
            Ok(row) => row.clone(),
            Err(err) => {
                tracing::warn!(sku = %sku, delta, "stock change rejected: {err}");
                return Err(err.into());
            }
        };
        self.store(&stock)?;

        tracing::debug!(key = %updated.key(), delta, quantity = updated.quantity(), "stock changed");
        Ok(updated)
    }

    fn store(&self, stock: &StockSnapshot) -> Result<(), LedgerError> {
        let records = encode(Collection::Products, stock.rows())?;
        self.backing.port().write(Collection::Products, records)?;
        Ok(())
    }
}
