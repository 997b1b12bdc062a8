//! The JSON-file backend through the facade: reopen, atomic commits, corruption.

use stockmaster_core::{Entity, Sku, WarehouseId};
use stockmaster_infra::{
    AnyPersistence, JsonFilePersistence, LedgerConfig, LedgerError, LocalBus, PersistenceError,
    StockMaster,
};
use stockmaster_inventory::{DocumentStatus, MoveLine, NewDocument, NewProduct};

fn config(dir: &std::path::Path) -> LedgerConfig {
    LedgerConfig {
        data_dir: Some(dir.to_path_buf()),
        ..LedgerConfig::default()
    }
}

fn sku(s: &str) -> Sku {
    Sku::new(s).unwrap()
}

fn wh(s: &str) -> WarehouseId {
    WarehouseId::new(s).unwrap()
}

#[test]
fn validated_state_survives_reopen() -> anyhow::Result<()> {
    stockmaster_observability::init_for_tests();
    let dir = tempfile::tempdir()?;

    let receipt_id = {
        let m = StockMaster::open(&config(dir.path()))?;
        m.create_product(NewProduct::new("PRD-010", "Gear").with_quantity(10))?;
        let receipt = m.create_document(NewDocument::receipt(
            wh("WH-A"),
            "Acme",
            vec![MoveLine::new(sku("PRD-010"), 5)],
        ))?;
        m.validate_document(receipt.id())?;
        receipt.id()
    };

    let m = StockMaster::open(&config(dir.path()))?;
    assert_eq!(m.available(&sku("PRD-010"), &wh("WH-A"))?, 15);
    assert_eq!(m.find_document(receipt_id)?.map(|d| d.status()), Some(DocumentStatus::Done));

    let next = m.create_document(NewDocument::receipt(
        wh("WH-A"),
        "Acme",
        vec![MoveLine::new(sku("PRD-010"), 1)],
    ))?;
    assert_eq!(next.id().to_string(), "R-002");
    Ok(())
}

#[test]
fn rejected_validation_leaves_file_untouched() -> anyhow::Result<()> {
    stockmaster_observability::init_for_tests();
    let dir = tempfile::tempdir()?;
    let m = StockMaster::open(&config(dir.path()))?;
    m.create_product(NewProduct::new("PRD-010", "Gear").with_quantity(3))?;
    let delivery = m.documents().create_document(NewDocument::delivery(
        wh("WH-A"),
        "Beta",
        vec![MoveLine::new(sku("PRD-010"), 2), MoveLine::new(sku("PRD-010"), 2)],
    ))?;

    let path = dir.path().join("ledger.json");
    let before = std::fs::read_to_string(&path)?;
    assert!(m.validate_document(delivery.id()).is_err());
    assert_eq!(std::fs::read_to_string(&path)?, before);
    Ok(())
}

#[test]
fn seeding_applies_only_to_an_empty_file() -> anyhow::Result<()> {
    stockmaster_observability::init_for_tests();
    let dir = tempfile::tempdir()?;
    let seeded = LedgerConfig {
        seed_demo: true,
        ..config(dir.path())
    };

    let m = StockMaster::open(&seeded)?;
    m.create_product(NewProduct::new("PRD-099", "Extra"))?;
    drop(m);

    let m = StockMaster::open(&seeded)?;
    assert_eq!(m.list_products()?.len(), 5);
    assert_eq!(m.list_documents()?.len(), 2);
    Ok(())
}

#[test]
fn corrupt_file_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("ledger.json"), "{\"products\": [")?;

    let m = StockMaster::new(
        AnyPersistence::File(JsonFilePersistence::open(dir.path())?),
        LocalBus::default(),
        &LedgerConfig::default(),
    )?;
    let err = m.list_products().unwrap_err();
    assert!(matches!(err, LedgerError::Persistence(PersistenceError::Corrupt(_))));
    Ok(())
}
