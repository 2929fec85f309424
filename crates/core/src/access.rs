//! Owner allow-list for target management.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Which owners may manage targets.
///
/// An empty list admits every owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: BTreeSet<DbId>,
}

impl AccessPolicy {
    pub fn new(allowed: impl IntoIterator<Item = DbId>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Policy that admits every owner.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn is_allowed(&self, owner_id: DbId) -> bool {
        self.is_open() || self.allowed.contains(&owner_id)
    }

    pub fn authorize(&self, owner_id: DbId) -> Result<(), CoreError> {
        if self.is_allowed(owner_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "owner {owner_id} may not manage targets"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn open_policy_admits_everyone() {
        let policy = AccessPolicy::open();
        assert!(policy.is_open());
        assert!(policy.authorize(12345).is_ok());
    }

    #[test]
    fn listed_owners_only() {
        let policy = AccessPolicy::new([1, 2]);
        assert!(policy.authorize(1).is_ok());
        assert_matches!(policy.authorize(3), Err(CoreError::Forbidden(_)));
    }
}
