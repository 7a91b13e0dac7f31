//! The single chat that receives delivery notifications.

use std::sync::{PoisonError, RwLock};

use crate::types::GroupId;

/// Holds at most one delivery target. Last designation wins.
#[derive(Debug, Default)]
pub struct DeliveryGroupRegistry {
    current: RwLock<Option<GroupId>>,
}

impl DeliveryGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the delivery target, returning the previous one.
    pub fn designate(&self, group: GroupId) -> Option<GroupId> {
        // The cell only ever holds a complete value, so a poisoned lock is still usable.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.replace(group)
    }

    pub fn current(&self) -> Option<GroupId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatId;

    #[test]
    fn absent_until_designated() {
        assert!(DeliveryGroupRegistry::new().current().is_none());
    }

    #[test]
    fn repeated_designation_is_idempotent() {
        let registry = DeliveryGroupRegistry::new();
        let group = ChatId::new("-100");

        registry.designate(group.clone());
        assert_eq!(registry.designate(group.clone()), Some(group.clone()));
        assert_eq!(registry.current(), Some(group));
    }

    #[test]
    fn last_designation_wins() {
        let registry = DeliveryGroupRegistry::new();
        registry.designate(ChatId::new("-100"));
        let previous = registry.designate(ChatId::new("-200"));

        assert_eq!(previous, Some(ChatId::new("-100")));
        assert_eq!(registry.current(), Some(ChatId::new("-200")));
    }
}
