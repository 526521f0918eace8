use crate::clock::VersionVector;
use crate::errors::ConcordResult;
use crate::models::{EntitySnapshot, EntityType};

/// Keyed entity storage owned by the storage collaborator.
pub trait IEntityStore: Send + Sync {
    fn get(&self, entity_type: &EntityType, entity_id: &str)
        -> ConcordResult<Option<EntitySnapshot>>;

    /// Atomically replace the entity if its stored vector still equals
    /// `expected` (`None` = the entity must not exist yet). Otherwise fails
    /// with `StaleWriteRejected`.
    fn compare_and_set(
        &self,
        expected: Option<&VersionVector>,
        snapshot: &EntitySnapshot,
    ) -> ConcordResult<()>;
}
