use crate::models::EntityType;

/// Read access to parent pointers of stored entities, used to validate
/// merged hierarchies.
pub trait IHierarchyLookup: Send + Sync {
    fn parent_of(&self, entity_type: &EntityType, entity_id: &str) -> Option<String>;
}

/// Lookup that knows no parents. Only direct self-references are caught.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHierarchy;

impl IHierarchyLookup for NoHierarchy {
    fn parent_of(&self, _entity_type: &EntityType, _entity_id: &str) -> Option<String> {
        None
    }
}
