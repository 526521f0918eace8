/// Concord version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pseudo-field naming the tombstone in conflict field lists.
pub const TOMBSTONE_FIELD: &str = "_deleted";

/// Pseudo-field naming the entity type tag in conflict field lists.
pub const ENTITY_TYPE_FIELD: &str = "_entity_type";

/// Pseudo-field added when a version vector fails validation.
pub const VERSION_FIELD: &str = "_version";

/// Maximum ancestor walk when validating merged hierarchies.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Length of the hex conflict id derived from the detection inputs.
pub const CONFLICT_ID_HEX_LEN: usize = 32;
