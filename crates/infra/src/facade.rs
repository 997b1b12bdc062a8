//! The narrow contract offered to forms and pages: one object wiring the
//! stores, the ledger engine and event publication together.

use std::sync::Arc;

use chrono::Utc;

use stockmaster_core::{ActorId, DocumentId, Sku, WarehouseId};
use stockmaster_events::{EventBus, InMemoryEventBus, Subscription};
use stockmaster_inventory::{
    Document, DocumentCreated, DocumentStatus, InventoryEvent, NewDocument, NewProduct,
    PatchReport, Product, ProductCreated, ProductPatch, ProductUpdated,
};

use crate::backing::{Backing, encode};
use crate::config::LedgerConfig;
use crate::document_store::{DocumentFilter, DocumentStore};
use crate::error::LedgerError;
use crate::ledger::LedgerEngine;
use crate::persistence::{
    AnyPersistence, Collection, InMemoryPersistence, JsonFilePersistence, PersistencePort,
};
use crate::publisher::{EventPublisher, InventoryEnvelope};
use crate::seed;
use crate::stock_store::StockStore;
use crate::summary::InventorySummary;

/// Bus used by [`StockMaster::open`].
pub type LocalBus = Arc<InMemoryEventBus<InventoryEnvelope>>;

pub struct StockMaster<P, B> {
    stock: StockStore<P>,
    documents: DocumentStore<P>,
    ledger: LedgerEngine<P, B>,
    publisher: Arc<EventPublisher<B>>,
}

impl StockMaster<AnyPersistence, LocalBus> {
    /// Open the backend selected by `config` with an in-process bus.
    pub fn open(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let port = match &config.data_dir {
            Some(dir) => {
                tracing::info!(data_dir = %dir.display(), "opening json-file persistence");
                AnyPersistence::File(JsonFilePersistence::open(dir)?)
            }
            None => {
                tracing::info!("opening in-memory persistence");
                AnyPersistence::Memory(InMemoryPersistence::new())
            }
        };
        Self::new(port, Arc::new(InMemoryEventBus::new()), config)
    }
}

impl<P, B> StockMaster<P, B>
where
    P: PersistencePort,
    B: EventBus<InventoryEnvelope>,
{
    pub fn new(port: P, bus: B, config: &LedgerConfig) -> Result<Self, LedgerError> {
        let backing = Backing::new(port);
        let stock = StockStore::new(backing.clone(), config.defaults.clone());
        let documents = DocumentStore::new(backing);
        let publisher = Arc::new(EventPublisher::new(bus));
        let ledger = LedgerEngine::new(stock.clone(), documents.clone(), Arc::clone(&publisher))?;

        let master = Self {
            stock,
            documents,
            ledger,
            publisher,
        };
        if config.seed_demo {
            master.seed_demo_data()?;
        }
        Ok(master)
    }

    pub fn stock(&self) -> &StockStore<P> {
        &self.stock
    }

    pub fn documents(&self) -> &DocumentStore<P> {
        &self.documents
    }

    pub fn ledger(&self) -> &LedgerEngine<P, B> {
        &self.ledger
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> Subscription<InventoryEnvelope> {
        self.publisher.subscribe()
    }

    // Products

    pub fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        self.stock.list_products()
    }

    pub fn find_product(&self, sku: &Sku) -> Result<Option<Product>, LedgerError> {
        self.stock.find_product(sku)
    }

    pub fn find_product_at(&self, sku: &Sku, warehouse: &WarehouseId) -> Result<Option<Product>, LedgerError> {
        self.stock.find_product_at(sku, warehouse)
    }

    pub fn create_product(&self, new: NewProduct) -> Result<Product, LedgerError> {
        let product = self.stock.create_product(new)?;
        self.publisher.publish(
            ActorId::system(),
            vec![InventoryEvent::ProductCreated(ProductCreated {
                product: product.clone(),
                occurred_at: Utc::now(),
            })],
        );
        Ok(product)
    }

    /// Update the first row for `sku`.
    pub fn update_product(&self, sku: &Sku, patch: &ProductPatch) -> Result<Product, LedgerError> {
        Ok(self.update_product_at(sku, None, patch)?.product)
    }

    pub fn update_product_at(
        &self,
        sku: &Sku,
        warehouse: Option<&WarehouseId>,
        patch: &ProductPatch,
    ) -> Result<PatchReport, LedgerError> {
        let report = self.stock.update_product(sku, warehouse, patch)?;
        self.publisher.publish(
            ActorId::system(),
            vec![InventoryEvent::ProductUpdated(ProductUpdated {
                key: report.product.key(),
                quantity: report.product.quantity(),
                occurred_at: Utc::now(),
            })],
        );
        Ok(report)
    }

    pub fn available(&self, sku: &Sku, warehouse: &WarehouseId) -> Result<u64, LedgerError> {
        self.stock.available(sku, warehouse)
    }

    pub fn low_stock(&self) -> Result<Vec<Product>, LedgerError> {
        self.stock.low_stock()
    }

    // Documents

    pub fn list_documents(&self) -> Result<Vec<Document>, LedgerError> {
        self.documents.list_documents()
    }

    pub fn list_documents_filtered(&self, filter: &DocumentFilter) -> Result<Vec<Document>, LedgerError> {
        self.documents.list_filtered(filter)
    }

    pub fn find_document(&self, id: DocumentId) -> Result<Option<Document>, LedgerError> {
        self.documents.find_document(id)
    }

    /// Create a document after the form-level checks: shape, known SKUs and,
    /// for deliveries and transfers, enough stock at the source right now.
    pub fn create_document(&self, new: NewDocument) -> Result<Document, LedgerError> {
        new.validate()?;
        if let Err(err) = new.precheck(&self.stock.snapshot()?) {
            tracing::warn!(kind = new.kind().as_str(), "document rejected by availability check: {err}");
            return Err(err.into());
        }

        let document = self.documents.create_document(new)?;
        self.publisher.publish(
            ActorId::system(),
            vec![InventoryEvent::DocumentCreated(DocumentCreated {
                document: document.id_typed(),
                kind: document.kind(),
                status: document.status(),
                occurred_at: Utc::now(),
            })],
        );
        Ok(document)
    }

    pub fn validate_document(&self, id: DocumentId) -> Result<Document, LedgerError> {
        self.ledger.validate_document(id)
    }

    pub fn validate_document_as(&self, id: DocumentId, actor: ActorId) -> Result<Document, LedgerError> {
        self.ledger.validate_document_as(id, actor)
    }

    pub fn transition_document(
        &self,
        id: DocumentId,
        target: DocumentStatus,
        actor: ActorId,
    ) -> Result<Document, LedgerError> {
        self.ledger.transition_document(id, target, actor)
    }

    pub fn cancel_document(&self, id: DocumentId, actor: ActorId) -> Result<Document, LedgerError> {
        self.ledger.cancel_document(id, actor)
    }

    // Dashboard and maintenance

    pub fn summary(&self) -> Result<InventorySummary, LedgerError> {
        let stock = self.stock.snapshot()?;
        let documents = self.documents.list_documents()?;
        Ok(InventorySummary::compute(&stock, &documents))
    }

    /// Write the demo products and documents if both collections are empty.
    /// Returns whether anything was written.
    pub fn seed_demo_data(&self) -> Result<bool, LedgerError> {
        let backing = self.stock.backing();
        let _guard = backing.lock()?;

        if !self.stock.snapshot()?.is_empty() || !self.documents.list_documents()?.is_empty() {
            tracing::debug!("store not empty; demo data not seeded");
            return Ok(false);
        }

        let products = seed::demo_products(self.stock.defaults())?;
        let documents = seed::demo_documents()?;
        backing.port().commit(vec![
            (Collection::Products, encode(Collection::Products, &products)?),
            (Collection::Documents, encode(Collection::Documents, &documents)?),
        ])?;

        tracing::info!(products = products.len(), documents = documents.len(), "demo data seeded");
        Ok(true)
    }

    /// Remove every product and document.
    pub fn reset(&self) -> Result<(), LedgerError> {
        let backing = self.stock.backing();
        let _guard = backing.lock()?;
        backing.port().commit(
            Collection::ALL
                .iter()
                .map(|&collection| (collection, Vec::new()))
                .collect(),
        )?;
        tracing::warn!("ledger reset; all products and documents removed");
        Ok(())
    }
}
