//! Typedef / alias registry.
//!
//! Process-wide record of which canonical names have been committed to a
//! native kind. The first commit for a name wins; later commits must agree
//! with it exactly or fail with [`WidthError::Conflict`]. Entries are never
//! removed.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::WidthError;
use crate::resolve::ResolvedType;

/// What a successful [`TypeRegistry::bind`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindOutcome {
    /// First commitment for the name.
    Committed,
    /// Name was already bound to an identical resolution.
    AlreadyBound,
}

#[derive(Debug, Clone)]
struct Entry {
    resolved: ResolvedType,
    committed_by: String,
}

/// Canonical-name commitment map.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `resolved` under its canonical name.
    pub fn bind(&self, resolved: &ResolvedType) -> Result<BindOutcome, WidthError> {
        self.bind_from("<anonymous>", resolved)
    }

    /// Commit `resolved`, recording which collaborator made the first commit.
    ///
    /// The check and the insert happen under one lock.
    pub fn bind_from(
        &self,
        collaborator: &str,
        resolved: &ResolvedType,
    ) -> Result<BindOutcome, WidthError> {
        let mut entries = self.entries.lock();
        match entries.get(&resolved.name) {
            Some(entry) if entry.resolved == *resolved => Ok(BindOutcome::AlreadyBound),
            Some(entry) => Err(WidthError::Conflict {
                name: resolved.name.clone(),
                committed: Box::new(entry.resolved.clone()),
                attempted: Box::new(resolved.clone()),
            }),
            None => {
                entries.insert(
                    resolved.name.clone(),
                    Entry {
                        resolved: resolved.clone(),
                        committed_by: collaborator.to_string(),
                    },
                );
                Ok(BindOutcome::Committed)
            }
        }
    }

    /// Whether `name` has been committed.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ResolvedType> {
        self.entries
            .lock()
            .get(name)
            .map(|entry| entry.resolved.clone())
    }

    /// Collaborator that made the first commit for `name`.
    #[must_use]
    pub fn committed_by(&self, name: &str) -> Option<String> {
        self.entries
            .lock()
            .get(name)
            .map(|entry| entry.committed_by.clone())
    }

    /// Sorted copy of every committed entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, ResolvedType> {
        self.entries
            .lock()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.resolved.clone()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// Process-wide registry shared by every collaborator.
#[must_use]
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(TypeRegistry::new)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::kind::NativeKind;

    fn size_t(kind: NativeKind, width: u32) -> ResolvedType {
        ResolvedType {
            name: String::from("size_t"),
            kind,
            width,
            signed: false,
        }
    }

    #[test]
    fn identical_rebind_is_a_no_op() {
        let registry = TypeRegistry::new();
        let ty = size_t(NativeKind::Long, 64);
        assert_eq!(registry.bind_from("stddef", &ty), Ok(BindOutcome::Committed));
        assert_eq!(registry.bind_from("wchar", &ty), Ok(BindOutcome::AlreadyBound));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.committed_by("size_t").as_deref(), Some("stddef"));
    }

    #[test]
    fn conflicting_rebind_fails_and_keeps_first() {
        let registry = TypeRegistry::new();
        let first = size_t(NativeKind::Long, 64);
        let second = size_t(NativeKind::LongLong, 64);
        registry.bind(&first).unwrap();
        let err = registry.bind(&second).unwrap_err();
        assert!(matches!(err, WidthError::Conflict { ref name, .. } if name == "size_t"));
        assert_eq!(registry.get("size_t"), Some(first));
        assert!(registry.is_defined("size_t"));
    }

    #[test]
    fn concurrent_binds_have_single_winner() {
        let registry = Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let kind = if i % 2 == 0 {
                        NativeKind::Long
                    } else {
                        NativeKind::LongLong
                    };
                    registry.bind(&size_t(kind, 64))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let committed = results
            .iter()
            .filter(|r| matches!(r, Ok(BindOutcome::Committed)))
            .count();
        assert_eq!(committed, 1);
        let winner = registry.get("size_t").unwrap();
        for result in results {
            match result {
                Ok(_) => {}
                Err(WidthError::Conflict { committed, .. }) => assert_eq!(*committed, winner),
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn global_registry_is_shared() {
        let a = global_registry() as *const TypeRegistry;
        let b = global_registry() as *const TypeRegistry;
        assert_eq!(a, b);
    }
}
