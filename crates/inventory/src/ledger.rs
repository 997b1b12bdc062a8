//! Validation planning: the stock effect of each document type.
//!
//! Planning runs against a private copy of the stock snapshot. Either every
//! line applies and the caller gets the updated copy back, or the first
//! failing line aborts the plan and the caller's snapshot is untouched.

use serde::{Deserialize, Serialize};

use stockmaster_core::{DocumentId, DomainError, DomainResult, Sku, WarehouseId};

use crate::document::{
    CountLine, Document, DocumentBody, DocumentStatus, DocumentType, MoveLine,
    check_counterpart, check_positive_quantities, check_transfer_route,
};
use crate::product::{Product, ProductDefaults};
use crate::stock::StockSnapshot;

/// One applied stock effect, for move history and audit.
///
/// `from` is set when stock left a warehouse, `to` when it arrived; a transfer
/// sets both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub document: DocumentId,
    pub kind: DocumentType,
    pub sku: Sku,
    pub from: Option<WarehouseId>,
    pub to: Option<WarehouseId>,
    pub quantity: u64,
}

/// Outcome of a successful dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPlan {
    /// Stock after every line was applied.
    pub stock: StockSnapshot,
    /// The document, already moved to `Done`.
    pub document: Document,
    pub movements: Vec<StockMovement>,
}

/// Dry-run validation of `document` against `stock`.
pub fn plan_validation(
    document: &Document,
    stock: &StockSnapshot,
    defaults: &ProductDefaults,
) -> DomainResult<ValidationPlan> {
    let mut done = document.clone();
    done.transition(DocumentStatus::Done)?;

    if document.body().line_count() == 0 {
        return Err(DomainError::invalid_input(format!(
            "document {} has no lines",
            document.id_typed()
        )));
    }
    check_counterpart(document.body())?;

    let mut planner = Planner {
        document: document.id_typed(),
        kind: document.kind(),
        warehouse: document.warehouse(),
        stock: stock.clone(),
        movements: Vec::new(),
    };

    match document.body() {
        DocumentBody::Receipt { items, .. } => planner.receive(items)?,
        DocumentBody::Delivery { items, .. } => planner.deliver(items)?,
        DocumentBody::InternalTransfer { items, to_warehouse } => {
            let doc_ref = document.id_typed().to_string();
            check_transfer_route(document.warehouse(), to_warehouse.as_ref(), &doc_ref)?;
            if let Some(to) = to_warehouse {
                planner.transfer(items, to)?;
            }
        }
        DocumentBody::Adjustment { items, .. } => planner.count(items, defaults)?,
    }

    Ok(ValidationPlan {
        stock: planner.stock,
        document: done,
        movements: planner.movements,
    })
}

struct Planner<'a> {
    document: DocumentId,
    kind: DocumentType,
    warehouse: Option<&'a WarehouseId>,
    stock: StockSnapshot,
    movements: Vec<StockMovement>,
}

impl Planner<'_> {
    fn record(&mut self, sku: &Sku, from: Option<WarehouseId>, to: Option<WarehouseId>, quantity: u64) {
        self.movements.push(StockMovement {
            document: self.document,
            kind: self.kind,
            sku: sku.clone(),
            from,
            to,
            quantity,
        });
    }

    fn receive(&mut self, lines: &[MoveLine]) -> DomainResult<()> {
        check_positive_quantities(lines)?;
        for line in lines {
            let delta = as_delta(line.qty)?;
            let row = self.stock.change_stock(&line.sku, delta, self.warehouse)?;
            let to = row.warehouse().clone();
            self.record(&line.sku, None, Some(to), line.qty);
        }
        Ok(())
    }

    fn deliver(&mut self, lines: &[MoveLine]) -> DomainResult<()> {
        check_positive_quantities(lines)?;
        for line in lines {
            let delta = as_delta(line.qty)?;
            let row = self.stock.change_stock(&line.sku, -delta, self.warehouse)?;
            let from = row.warehouse().clone();
            self.record(&line.sku, Some(from), None, line.qty);
        }
        Ok(())
    }

    fn transfer(&mut self, lines: &[MoveLine], to: &WarehouseId) -> DomainResult<()> {
        check_positive_quantities(lines)?;
        for line in lines {
            let delta = as_delta(line.qty)?;
            let source: Product = self
                .stock
                .change_stock(&line.sku, -delta, self.warehouse)?
                .clone();

            if self.stock.find_at(&line.sku, to).is_some() {
                self.stock.change_stock(&line.sku, delta, Some(to))?;
            } else {
                self.stock.insert(source.clone_to(to.clone(), line.qty))?;
            }

            self.record(
                &line.sku,
                Some(source.warehouse().clone()),
                Some(to.clone()),
                line.qty,
            );
        }
        Ok(())
    }

    fn count(&mut self, lines: &[CountLine], defaults: &ProductDefaults) -> DomainResult<()> {
        for line in lines {
            let existing = match self.warehouse {
                Some(w) => self.stock.find_at(&line.sku, w),
                None => self.stock.find(&line.sku),
            };

            let (warehouse, previous) = match existing {
                Some(row) => {
                    let warehouse = row.warehouse().clone();
                    let previous = row.quantity();
                    self.stock.set_stock(&line.sku, line.qty_counted, Some(&warehouse))?;
                    (warehouse, previous)
                }
                None => {
                    let warehouse = self
                        .warehouse
                        .cloned()
                        .unwrap_or_else(|| defaults.warehouse.clone());
                    self.stock.insert(Product::counted(
                        line.sku.clone(),
                        warehouse.clone(),
                        line.qty_counted,
                        defaults,
                    ))?;
                    (warehouse, 0)
                }
            };

            if line.qty_counted > previous {
                self.record(&line.sku, None, Some(warehouse), line.qty_counted - previous);
            } else if line.qty_counted < previous {
                self.record(&line.sku, Some(warehouse), None, previous - line.qty_counted);
            }
        }
        Ok(())
    }
}

fn as_delta(qty: u64) -> DomainResult<i64> {
    i64::try_from(qty).map_err(|_| DomainError::invalid_input(format!("quantity {qty} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NewDocument;
    use crate::product::NewProduct;
    use stockmaster_core::DocumentPrefix;

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn wh(s: &str) -> WarehouseId {
        WarehouseId::new(s).unwrap()
    }

    fn defaults() -> ProductDefaults {
        ProductDefaults::default()
    }

    fn row(code: &str, warehouse: &str, qty: i64) -> Product {
        NewProduct::new(code, format!("{code} name"))
            .with_category("Widgets")
            .with_unit_of_measure("box")
            .with_reorder_threshold(2)
            .with_warehouse(warehouse)
            .with_quantity(qty)
            .into_product(&defaults())
            .unwrap()
    }

    fn doc(prefix: DocumentPrefix, new: NewDocument) -> Document {
        Document::from_new(DocumentId::first(prefix), new)
    }

    fn stock() -> StockSnapshot {
        StockSnapshot::new(vec![row("PRD-010", "WH-A", 15), row("PRD-020", "WH-A", 1)])
    }

    #[test]
    fn receipt_adds_to_warehouse_row() {
        let d = doc(
            DocumentPrefix::Receipt,
            NewDocument::receipt(wh("WH-A"), "Acme", vec![MoveLine::new(sku("PRD-010"), 5)]),
        );
        let plan = plan_validation(&d, &stock(), &defaults()).unwrap();
        assert_eq!(plan.stock.available(&sku("PRD-010"), &wh("WH-A")), 20);
        assert_eq!(plan.document.status(), DocumentStatus::Done);
        assert_eq!(plan.movements.len(), 1);
        assert_eq!(plan.movements[0].to, Some(wh("WH-A")));
    }

    #[test]
    fn receipt_for_missing_row_fails() {
        let d = doc(
            DocumentPrefix::Receipt,
            NewDocument::receipt(wh("WH-B"), "Acme", vec![MoveLine::new(sku("PRD-010"), 5)]),
        );
        let err = plan_validation(&d, &stock(), &defaults()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn delivery_failure_on_later_line_leaves_input_untouched() {
        let original = stock();
        let d = doc(
            DocumentPrefix::Delivery,
            NewDocument::delivery(
                wh("WH-A"),
                "Beta",
                vec![MoveLine::new(sku("PRD-010"), 5), MoveLine::new(sku("PRD-020"), 2)],
            ),
        );
        let err = plan_validation(&d, &original, &defaults()).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { available: 1, requested: 2, .. }));
        assert_eq!(original, stock());
    }

    #[test]
    fn repeated_delivery_lines_accumulate() {
        let d = doc(
            DocumentPrefix::Delivery,
            NewDocument::delivery(
                wh("WH-A"),
                "Beta",
                vec![MoveLine::new(sku("PRD-010"), 10), MoveLine::new(sku("PRD-010"), 10)],
            ),
        );
        assert!(matches!(
            plan_validation(&d, &stock(), &defaults()),
            Err(DomainError::InsufficientStock { available: 5, requested: 10, .. })
        ));
    }

    #[test]
    fn transfer_clones_missing_destination_row() {
        let d = doc(
            DocumentPrefix::Transfer,
            NewDocument::transfer(wh("WH-A"), wh("WH-B"), vec![MoveLine::new(sku("PRD-010"), 5)]),
        );
        let plan = plan_validation(&d, &stock(), &defaults()).unwrap();

        assert_eq!(plan.stock.available(&sku("PRD-010"), &wh("WH-A")), 10);
        let dest = plan.stock.find_at(&sku("PRD-010"), &wh("WH-B")).unwrap();
        assert_eq!(dest.quantity(), 5);
        assert_eq!(dest.category(), "Widgets");
        assert_eq!(dest.unit_of_measure(), "box");
        assert_eq!(dest.reorder_threshold(), 2);
        assert_eq!(plan.stock.total_quantity(&sku("PRD-010")), 15);
    }

    #[test]
    fn transfer_adds_to_existing_destination_row() {
        let mut s = stock();
        s.insert(row("PRD-010", "WH-B", 1)).unwrap();
        let d = doc(
            DocumentPrefix::Transfer,
            NewDocument::transfer(wh("WH-A"), wh("WH-B"), vec![MoveLine::new(sku("PRD-010"), 5)]),
        );
        let plan = plan_validation(&d, &s, &defaults()).unwrap();
        assert_eq!(plan.stock.available(&sku("PRD-010"), &wh("WH-B")), 6);
        assert_eq!(plan.stock.len(), s.len());
    }

    #[test]
    fn transfer_without_destination_fails() {
        let mut new = NewDocument::transfer(wh("WH-A"), wh("WH-B"), vec![MoveLine::new(sku("PRD-010"), 5)]);
        if let DocumentBody::InternalTransfer { to_warehouse, .. } = &mut new.body {
            *to_warehouse = None;
        }
        let d = doc(DocumentPrefix::Transfer, new);
        let err = plan_validation(&d, &stock(), &defaults()).unwrap_err();
        assert_eq!(err, DomainError::MissingDestination("T-001".to_string()));
    }

    #[test]
    fn adjustment_sets_counted_quantity() {
        let d = doc(
            DocumentPrefix::Adjustment,
            NewDocument::adjustment(wh("WH-A"), vec![CountLine::new(sku("PRD-010"), 3)]),
        );
        let plan = plan_validation(&d, &stock(), &defaults()).unwrap();
        assert_eq!(plan.stock.available(&sku("PRD-010"), &wh("WH-A")), 3);
        assert_eq!(plan.movements[0].from, Some(wh("WH-A")));
        assert_eq!(plan.movements[0].quantity, 12);
    }

    #[test]
    fn adjustment_creates_row_with_defaults() {
        let d = doc(
            DocumentPrefix::Adjustment,
            NewDocument::adjustment(wh("WH-C"), vec![CountLine::new(sku("PRD-777"), 9)]),
        );
        let plan = plan_validation(&d, &stock(), &defaults()).unwrap();
        let created = plan.stock.find_at(&sku("PRD-777"), &wh("WH-C")).unwrap();
        assert_eq!(created.quantity(), 9);
        assert_eq!(created.name(), "PRD-777");
        assert_eq!(created.category(), "Uncategorized");
        assert_eq!(created.reorder_threshold(), 0);
    }

    #[test]
    fn stored_receipt_without_supplier_is_rejected() {
        let original = stock();
        let d: Document = serde_json::from_value(serde_json::json!({
            "id": "R-001",
            "status": "Draft",
            "warehouse": "WH-A",
            "type": "receipt",
            "supplier": "",
            "items": [{ "sku": "PRD-010", "qty": 5 }]
        }))
        .unwrap();

        let err = plan_validation(&d, &original, &defaults()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(original, stock());
    }

    #[test]
    fn done_document_cannot_be_planned_again() {
        let d = doc(
            DocumentPrefix::Receipt,
            NewDocument::receipt(wh("WH-A"), "Acme", vec![MoveLine::new(sku("PRD-010"), 5)]),
        );
        let plan = plan_validation(&d, &stock(), &defaults()).unwrap();
        let err = plan_validation(&plan.document, &plan.stock, &defaults()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a failed plan never changes the input; a successful
            /// transfer conserves the SKU's total.
            #[test]
            fn transfer_is_atomic_and_conserving(
                start in 0i64..40,
                qtys in proptest::collection::vec(1u64..15, 1..6),
            ) {
                let original = StockSnapshot::new(vec![row("PRD-001", "WH-A", start)]);
                let lines: Vec<MoveLine> = qtys.iter().map(|q| MoveLine::new(sku("PRD-001"), *q)).collect();
                let d = doc(
                    DocumentPrefix::Transfer,
                    NewDocument::transfer(wh("WH-A"), wh("WH-B"), lines),
                );

                let total: u64 = qtys.iter().sum();
                match plan_validation(&d, &original, &defaults()) {
                    Ok(plan) => {
                        prop_assert!(total <= start as u64);
                        prop_assert_eq!(plan.stock.total_quantity(&sku("PRD-001")), start as u64);
                        prop_assert_eq!(plan.stock.available(&sku("PRD-001"), &wh("WH-B")), total);
                    }
                    Err(DomainError::InsufficientStock { .. }) => {
                        prop_assert!(total > start as u64);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                }
                prop_assert_eq!(original.available(&sku("PRD-001"), &wh("WH-A")), start as u64);
            }
        }
    }
}
