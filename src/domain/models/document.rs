use serde::{de::DeserializeOwned, Serialize};

use crate::domain::value_objects::DocumentId;

/// An entity persisted as a document in a named collection
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Collection the entity lives in
    const COLLECTION: &'static str;

    /// Store-assigned id, `None` until the entity has been saved once
    fn id(&self) -> Option<&DocumentId>;

    fn set_id(&mut self, id: DocumentId);
}
