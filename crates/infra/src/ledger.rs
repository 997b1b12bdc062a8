//! Ledger Engine: validates documents and applies their stock effects.

use std::sync::Arc;

use chrono::Utc;

use stockmaster_core::{ActorId, DocumentId, DomainError, Entity};
use stockmaster_events::EventBus;
use stockmaster_inventory::{
    Document, DocumentStatus, DocumentStatusChanged, DocumentValidated, InventoryEvent, StockMoved,
    plan_validation,
};

use crate::backing::encode;
use crate::document_store::{DocumentStore, replace};
use crate::error::LedgerError;
use crate::persistence::{Collection, PersistencePort};
use crate::publisher::{EventPublisher, InventoryEnvelope};
use crate::stock_store::StockStore;

/// Owns the status machine of documents; the stores own the data.
///
/// Validation is all-or-nothing: every line is applied to a working copy of
/// the stock, and products plus the `Done` document land in one commit.
pub struct LedgerEngine<P, B> {
    stock: StockStore<P>,
    documents: DocumentStore<P>,
    publisher: Arc<EventPublisher<B>>,
}

impl<P, B> LedgerEngine<P, B>
where
    P: PersistencePort,
    B: EventBus<InventoryEnvelope>,
{
    /// Both stores must serialize writes through the same gate.
    pub fn new(
        stock: StockStore<P>,
        documents: DocumentStore<P>,
        publisher: Arc<EventPublisher<B>>,
    ) -> Result<Self, LedgerError> {
        if !stock.backing().shares_writer_with(documents.backing()) {
            return Err(DomainError::invalid_input(
                "stock and document stores must share one backing",
            )
            .into());
        }
        Ok(Self {
            stock,
            documents,
            publisher,
        })
    }

    /// Validate as the system actor.
    pub fn validate_document(&self, id: DocumentId) -> Result<Document, LedgerError> {
        self.validate_document_as(id, ActorId::system())
    }

    /// Apply the document's stock effect and mark it `Done`.
    ///
    /// On any failure nothing is committed and the document keeps its status.
    pub fn validate_document_as(&self, id: DocumentId, actor: ActorId) -> Result<Document, LedgerError> {
        let (document, movements) = {
            let _guard = self.stock.backing().lock()?;

            let mut documents = self.documents.list_documents()?;
            let current = documents
                .iter()
                .find(|d| d.id() == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("document", id.to_string()))?;

            let stock = self.stock.snapshot()?;
            let plan = plan_validation(&current, &stock, self.stock.defaults()).map_err(|err| {
                tracing::warn!(document = %id, status = %current.status(), "validation rejected: {err}");
                err
            })?;

            replace(&mut documents, &plan.document)?;
            self.stock.backing().port().commit(vec![
                (Collection::Products, encode(Collection::Products, plan.stock.rows())?),
                (Collection::Documents, encode(Collection::Documents, &documents)?),
            ])?;

            (plan.document, plan.movements)
        };

        tracing::info!(
            document = %id,
            kind = document.kind().as_str(),
            moves = movements.len(),
            actor = %actor,
            "document validated"
        );

        let now = Utc::now();
        let mut events: Vec<InventoryEvent> = movements
            .into_iter()
            .map(|movement| {
                InventoryEvent::StockMoved(StockMoved {
                    movement,
                    occurred_at: now,
                })
            })
            .collect();
        events.push(InventoryEvent::DocumentValidated(DocumentValidated {
            document: id,
            kind: document.kind(),
            occurred_at: now,
        }));
        self.publisher.publish(actor, events);

        Ok(document)
    }

    /// Move a document along a non-terminal edge (`Waiting`, `Ready`) or to
    /// `Canceled`. `Done` is only reachable through validation.
    pub fn transition_document(
        &self,
        id: DocumentId,
        target: DocumentStatus,
        actor: ActorId,
    ) -> Result<Document, LedgerError> {
        let (document, from) = {
            let _guard = self.documents.backing().lock()?;

            let mut documents = self.documents.list_documents()?;
            let mut document = documents
                .iter()
                .find(|d| d.id() == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("document", id.to_string()))?;
            let from = document.status();

            if target == DocumentStatus::Done {
                return Err(DomainError::invalid_transition(from.as_str(), target.as_str()).into());
            }
            document.transition(target)?;

            replace(&mut documents, &document)?;
            let records = encode(Collection::Documents, &documents)?;
            self.documents.backing().port().write(Collection::Documents, records)?;
            (document, from)
        };

        tracing::info!(document = %id, %from, to = %target, actor = %actor, "document status changed");
        self.publisher.publish(
            actor,
            vec![InventoryEvent::DocumentStatusChanged(DocumentStatusChanged {
                document: id,
                from,
                to: target,
                occurred_at: Utc::now(),
            })],
        );
        Ok(document)
    }

    pub fn cancel_document(&self, id: DocumentId, actor: ActorId) -> Result<Document, LedgerError> {
        self.transition_document(id, DocumentStatus::Canceled, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::Backing;
    use crate::persistence::InMemoryPersistence;
    use stockmaster_core::{Sku, WarehouseId};
    use stockmaster_events::InMemoryEventBus;
    use stockmaster_inventory::{MoveLine, NewDocument, NewProduct, ProductDefaults};

    type Engine = LedgerEngine<InMemoryPersistence, InMemoryEventBus<InventoryEnvelope>>;

    struct Fixture {
        stock: StockStore<InMemoryPersistence>,
        documents: DocumentStore<InMemoryPersistence>,
        engine: Engine,
    }

    fn fixture() -> Fixture {
        let backing = Backing::new(InMemoryPersistence::new());
        let stock = StockStore::new(backing.clone(), ProductDefaults::default());
        let documents = DocumentStore::new(backing);
        let publisher = Arc::new(EventPublisher::new(InMemoryEventBus::<InventoryEnvelope>::new()));
        let engine = LedgerEngine::new(stock.clone(), documents.clone(), publisher).unwrap();
        Fixture {
            stock,
            documents,
            engine,
        }
    }

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn wh(s: &str) -> WarehouseId {
        WarehouseId::new(s).unwrap()
    }

    #[test]
    fn stores_on_different_backings_are_rejected() {
        let stock = StockStore::new(Backing::new(InMemoryPersistence::new()), ProductDefaults::default());
        let documents = DocumentStore::new(Backing::new(InMemoryPersistence::new()));
        let publisher = Arc::new(EventPublisher::new(InMemoryEventBus::<InventoryEnvelope>::new()));
        assert!(LedgerEngine::new(stock, documents, publisher).is_err());
    }

    #[test]
    fn failed_delivery_commits_nothing() {
        let f = fixture();
        f.stock.create_product(NewProduct::new("PRD-010", "Gear").with_quantity(15)).unwrap();
        f.stock.create_product(NewProduct::new("PRD-011", "Bolt").with_quantity(1)).unwrap();
        let doc = f
            .documents
            .create_document(NewDocument::delivery(
                wh("WH-A"),
                "Beta",
                vec![MoveLine::new(sku("PRD-010"), 5), MoveLine::new(sku("PRD-011"), 2)],
            ))
            .unwrap();

        let err = f.engine.validate_document(doc.id()).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InsufficientStock { .. })));
        assert_eq!(f.stock.available(&sku("PRD-010"), &wh("WH-A")).unwrap(), 15);
        assert_eq!(
            f.documents.find_document(doc.id()).unwrap().unwrap().status(),
            DocumentStatus::Draft
        );
    }

    #[test]
    fn validating_twice_is_rejected() {
        let f = fixture();
        f.stock.create_product(NewProduct::new("PRD-010", "Gear").with_quantity(10)).unwrap();
        let doc = f
            .documents
            .create_document(NewDocument::receipt(wh("WH-A"), "Acme", vec![MoveLine::new(sku("PRD-010"), 5)]))
            .unwrap();

        f.engine.validate_document(doc.id()).unwrap();
        let err = f.engine.validate_document(doc.id()).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidTransition { .. })));
        assert_eq!(f.stock.available(&sku("PRD-010"), &wh("WH-A")).unwrap(), 15);
    }

    #[test]
    fn unknown_document_is_not_found() {
        let f = fixture();
        let id: DocumentId = "R-404".parse().unwrap();
        let err = f.engine.validate_document(id).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotFound { entity: "document", .. })));
    }

    #[test]
    fn transitions_follow_the_status_machine() {
        let f = fixture();
        let doc = f
            .documents
            .create_document(NewDocument::receipt(wh("WH-A"), "Acme", vec![MoveLine::new(sku("PRD-010"), 5)]))
            .unwrap();
        let actor = ActorId::new();

        let ready = f.engine.transition_document(doc.id(), DocumentStatus::Ready, actor).unwrap();
        assert_eq!(ready.status(), DocumentStatus::Ready);

        let err = f
            .engine
            .transition_document(doc.id(), DocumentStatus::Waiting, actor)
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidTransition { .. })));

        let err = f
            .engine
            .transition_document(doc.id(), DocumentStatus::Done, actor)
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidTransition { .. })));

        let canceled = f.engine.cancel_document(doc.id(), actor).unwrap();
        assert_eq!(canceled.status(), DocumentStatus::Canceled);
        assert!(f.engine.validate_document(doc.id()).is_err());
    }

    #[test]
    fn published_events_follow_commit() {
        let backing = Backing::new(InMemoryPersistence::new());
        let stock = StockStore::new(backing.clone(), ProductDefaults::default());
        let documents = DocumentStore::new(backing);
        let publisher = Arc::new(EventPublisher::new(InMemoryEventBus::<InventoryEnvelope>::new()));
        let sub = publisher.subscribe();
        let engine = LedgerEngine::new(stock.clone(), documents.clone(), publisher).unwrap();

        stock.create_product(NewProduct::new("PRD-010", "Gear").with_quantity(10)).unwrap();
        let doc = documents
            .create_document(NewDocument::transfer(wh("WH-A"), wh("WH-B"), vec![MoveLine::new(sku("PRD-010"), 4)]))
            .unwrap();
        let actor = ActorId::new();
        engine.validate_document_as(doc.id(), actor).unwrap();

        let envelopes = sub.drain();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].sequence_number(), 1);
        assert_eq!(envelopes[1].sequence_number(), 2);
        assert!(envelopes.iter().all(|e| e.actor() == actor));
        match envelopes[0].payload() {
            InventoryEvent::StockMoved(moved) => {
                assert_eq!(moved.movement.from, Some(wh("WH-A")));
                assert_eq!(moved.movement.to, Some(wh("WH-B")));
                assert_eq!(moved.movement.quantity, 4);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(envelopes[1].payload(), InventoryEvent::DocumentValidated(_)));
    }
}
