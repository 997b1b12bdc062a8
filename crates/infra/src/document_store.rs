//! Document Store: movement documents and their sequential ids.

use serde::{Deserialize, Serialize};

use stockmaster_core::{DocumentId, DocumentPrefix, DomainError, Entity, WarehouseId};
use stockmaster_inventory::{Document, DocumentBody, DocumentStatus, DocumentType, NewDocument};

use crate::backing::{Backing, encode};
use crate::error::LedgerError;
use crate::persistence::{Collection, PersistencePort};

/// Criteria for [`DocumentStore::list_filtered`]. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub kind: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
    pub warehouse: Option<WarehouseId>,
}

impl DocumentFilter {
    pub fn kind(kind: DocumentType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseId) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// A transfer matches a warehouse on either end.
    pub fn matches(&self, document: &Document) -> bool {
        let kind = self.kind.is_none_or(|k| document.kind() == k);
        let status = self.status.is_none_or(|s| document.status() == s);
        let warehouse = self.warehouse.as_ref().is_none_or(|w| {
            document.warehouse() == Some(w)
                || matches!(
                    document.body(),
                    DocumentBody::InternalTransfer { to_warehouse: Some(to), .. } if to == w
                )
        });
        kind && status && warehouse
    }
}

/// Owns the `documents` collection (newest first).
#[derive(Debug)]
pub struct DocumentStore<P> {
    backing: Backing<P>,
}

impl<P> Clone for DocumentStore<P> {
    fn clone(&self) -> Self {
        Self {
            backing: self.backing.clone(),
        }
    }
}

impl<P: PersistencePort> DocumentStore<P> {
    pub fn new(backing: Backing<P>) -> Self {
        Self { backing }
    }

    pub fn backing(&self) -> &Backing<P> {
        &self.backing
    }

    pub fn list_documents(&self) -> Result<Vec<Document>, LedgerError> {
        let documents: Vec<Document> = self.backing.load(Collection::Documents)?;
        tracing::debug!(documents = documents.len(), "loaded documents");
        Ok(documents)
    }

    pub fn list_filtered(&self, filter: &DocumentFilter) -> Result<Vec<Document>, LedgerError> {
        Ok(self
            .list_documents()?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect())
    }

    pub fn find_document(&self, id: DocumentId) -> Result<Option<Document>, LedgerError> {
        Ok(self.list_documents()?.into_iter().find(|d| d.id() == id))
    }

    /// Next id for a prefix: highest existing sequence plus one, or 1.
    pub fn next_id(&self, prefix: DocumentPrefix) -> Result<DocumentId, LedgerError> {
        Ok(next_id_in(&self.list_documents()?, prefix)?)
    }

    /// Validate the request, assign the next id for its type and insert the
    /// document at the head of the list.
    pub fn create_document(&self, new: NewDocument) -> Result<Document, LedgerError> {
        new.validate()?;

        let _guard = self.backing.lock()?;
        let mut documents = self.list_documents()?;
        let id = next_id_in(&documents, new.kind().prefix())?;
        let document = Document::from_new(id, new);
        documents.insert(0, document.clone());
        self.store(&documents)?;

        tracing::info!(
            document = %id,
            kind = document.kind().as_str(),
            status = %document.status(),
            lines = document.body().line_count(),
            "document created"
        );
        Ok(document)
    }

    /// Replace a stored document by id, keeping its position.
    pub fn save_document(&self, document: &Document) -> Result<(), LedgerError> {
        let _guard = self.backing.lock()?;
        let mut documents = self.list_documents()?;
        replace(&mut documents, document)?;
        self.store(&documents)?;
        tracing::debug!(document = %document.id(), status = %document.status(), "document saved");
        Ok(())
    }

    fn store(&self, documents: &[Document]) -> Result<(), LedgerError> {
        let records = encode(Collection::Documents, documents)?;
        self.backing.port().write(Collection::Documents, records)?;
        Ok(())
    }
}

pub(crate) fn replace(documents: &mut [Document], document: &Document) -> Result<(), DomainError> {
    let slot = documents
        .iter_mut()
        .find(|d| d.id() == document.id())
        .ok_or_else(|| DomainError::not_found("document", document.id().to_string()))?;
    *slot = document.clone();
    Ok(())
}

fn next_id_in(documents: &[Document], prefix: DocumentPrefix) -> Result<DocumentId, DomainError> {
    documents
        .iter()
        .map(Document::id)
        .filter(|id| id.prefix() == prefix)
        .max()
        .map_or(Ok(DocumentId::first(prefix)), |last| last.next())
}
