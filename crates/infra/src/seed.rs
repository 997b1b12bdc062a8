//! Demo data for a fresh store.

use stockmaster_core::{DocumentId, DocumentPrefix, DomainResult, Sku, WarehouseId};
use stockmaster_inventory::{
    Document, DocumentStatus, MoveLine, NewDocument, NewProduct, Product, ProductDefaults,
};

/// (sku, name, category, quantity, warehouse, reorder threshold)
const DEMO_PRODUCTS: [(&str, &str, &str, i64, &str, i64); 4] = [
    ("PRD-001", "Blue Widget", "Widgets", 120, "WH-A", 50),
    ("PRD-002", "Red Widget", "Widgets", 4, "WH-B", 20),
    ("PRD-003", "Green Cable", "Cables", 0, "WH-A", 10),
    ("PRD-004", "Power Adapter", "Accessories", 32, "WH-C", 15),
];

pub fn demo_products(defaults: &ProductDefaults) -> DomainResult<Vec<Product>> {
    DEMO_PRODUCTS
        .iter()
        .map(|&(sku, name, category, quantity, warehouse, reorder)| {
            NewProduct::new(sku, name)
                .with_category(category)
                .with_unit_of_measure("pcs")
                .with_quantity(quantity)
                .with_warehouse(warehouse)
                .with_reorder_threshold(reorder)
                .into_product(defaults)
        })
        .collect()
}

/// A waiting receipt and a draft delivery.
pub fn demo_documents() -> DomainResult<Vec<Document>> {
    let receipt = NewDocument::receipt(
        WarehouseId::new("WH-A")?,
        "Acme",
        vec![MoveLine::new(Sku::new("PRD-001")?, 10)],
    )
    .with_status(DocumentStatus::Waiting);
    let delivery = NewDocument::delivery(
        WarehouseId::new("WH-B")?,
        "Beta",
        vec![MoveLine::new(Sku::new("PRD-002")?, 2)],
    );

    receipt.validate()?;
    delivery.validate()?;

    Ok(vec![
        Document::from_new(DocumentId::first(DocumentPrefix::Receipt), receipt),
        Document::from_new(DocumentId::first(DocumentPrefix::Delivery), delivery),
    ])
}
