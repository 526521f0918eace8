/// Domain-invariant violations raised by entity-level custom mergers.
///
/// Any of these aborts automatic resolution; the conflict is escalated to
/// manual and the message is kept on the conflict record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The merged parent pointer closes a loop in the hierarchy.
    #[error("cyclic hierarchy: {path}")]
    CyclicHierarchy { path: String },

    /// Ancestor walk exceeded the maximum depth.
    #[error("hierarchy deeper than {max_depth} levels starting at {entity_id}")]
    HierarchyTooDeep { entity_id: String, max_depth: usize },

    /// A field left a terminal value.
    #[error("field {field} regressed from terminal value {terminal}")]
    TerminalStateRegression { field: String, terminal: String },

    /// Both sides reached a terminal state but disagree on a pinned field.
    #[error("field {field} differs between two terminal versions")]
    TerminalFieldDivergence { field: String },
}

impl MergeError {
    /// Stable tag for logs. Carries no field values.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CyclicHierarchy { .. } => "cyclic_hierarchy",
            Self::HierarchyTooDeep { .. } => "hierarchy_too_deep",
            Self::TerminalStateRegression { .. } => "terminal_state_regression",
            Self::TerminalFieldDivergence { .. } => "terminal_field_divergence",
        }
    }

    /// The field the rule guards, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::TerminalStateRegression { field, .. }
            | Self::TerminalFieldDivergence { field } => Some(field),
            Self::CyclicHierarchy { .. } | Self::HierarchyTooDeep { .. } => None,
        }
    }
}
