//! Per-property options for observable properties.

use crate::equality::Equality;

/// Options applied when a property is made observable.
///
/// ```
/// use propbind::{Equality, ObserveConfig};
///
/// let config = ObserveConfig::default().with_equality(Equality::Strict);
/// assert_eq!(config.equality, Equality::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveConfig {
    /// Policy deciding whether a write is a change.
    pub equality: Equality,
}

impl ObserveConfig {
    /// Create a config with default options (loose equality).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comparison policy.
    #[must_use]
    pub fn with_equality(mut self, equality: Equality) -> Self {
        self.equality = equality;
        self
    }

    /// Shorthand for strict (non-coercive) comparison.
    #[must_use]
    pub fn strict() -> Self {
        Self::new().with_equality(Equality::Strict)
    }
}
