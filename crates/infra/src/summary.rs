//! Dashboard figures derived from the two stores.

use serde::{Deserialize, Serialize};

use stockmaster_inventory::{Document, DocumentType, StockSnapshot, StockStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Units on hand across every row.
    pub total_quantity: u64,
    pub product_rows: usize,
    /// Rows at or below their reorder threshold, including empty ones.
    pub low_stock: usize,
    pub out_of_stock: usize,
    /// Receipts not yet done or canceled.
    pub pending_receipts: usize,
    pub pending_deliveries: usize,
    pub internal_transfers: usize,
    pub adjustments: usize,
}

impl InventorySummary {
    pub fn compute(stock: &StockSnapshot, documents: &[Document]) -> Self {
        let rows = stock.rows();
        let pending = |kind: DocumentType| {
            documents
                .iter()
                .filter(|d| d.kind() == kind && !d.status().is_terminal())
                .count()
        };
        let all = |kind: DocumentType| documents.iter().filter(|d| d.kind() == kind).count();

        Self {
            total_quantity: rows.iter().map(|p| p.quantity()).sum(),
            product_rows: rows.len(),
            low_stock: stock.low_stock().count(),
            out_of_stock: rows
                .iter()
                .filter(|p| p.stock_status() == StockStatus::OutOfStock)
                .count(),
            pending_receipts: pending(DocumentType::Receipt),
            pending_deliveries: pending(DocumentType::Delivery),
            internal_transfers: all(DocumentType::InternalTransfer),
            adjustments: all(DocumentType::Adjustment),
        }
    }
}
