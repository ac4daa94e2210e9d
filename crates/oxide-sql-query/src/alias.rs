//! Scoped alias allocation.
//!
//! Statements open a scope while they render. Within one scope every
//! aliasable node receives a short name (`a`, `b`, ..., `z`, `ba`, ...) the
//! first time it is asked for one and keeps it until the outermost scope
//! closes. Nested statements reuse the enclosing allocation table, which is
//! how a correlated subquery refers to the alias of an outer table.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::error::{Result, SqlError};
use crate::render::NodeId;

const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Generates the alias for the `index`-th allocation.
///
/// Numbering is base 26 over lowercase letters:
///
/// ```rust
/// use oxide_sql_query::alias::alias;
///
/// assert_eq!(alias(0), "a");
/// assert_eq!(alias(25), "z");
/// assert_eq!(alias(26), "ba");
/// assert_eq!(alias(26 * 26), "baa");
/// ```
#[must_use]
pub fn alias(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(LETTERS[index % LETTERS.len()]));
        index /= LETTERS.len();
        if index == 0 {
            break;
        }
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Default)]
struct ScopeState {
    nested: usize,
    aliases: HashMap<NodeId, String>,
    exclude: HashSet<NodeId>,
}

/// Allocation table for one render pass.
#[derive(Debug, Default)]
pub struct AliasManager {
    state: RefCell<ScopeState>,
}

impl AliasManager {
    /// Creates a manager with no open scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a scope. The returned guard closes it when dropped; only the
    /// outermost close clears the table.
    pub fn enter(&self) -> AliasScope<'_> {
        self.state.borrow_mut().nested += 1;
        AliasScope { manager: self }
    }

    /// Opens a scope in which `ids` never receive an alias.
    pub fn enter_excluding(&self, ids: impl IntoIterator<Item = NodeId>) -> AliasScope<'_> {
        self.state.borrow_mut().exclude.extend(ids);
        self.enter()
    }

    /// Returns true while at least one scope is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.borrow().nested > 0
    }

    /// Returns the alias of `id`, allocating one on first request.
    ///
    /// Returns an empty string when no scope is open or `id` is excluded.
    #[must_use]
    pub fn get(&self, id: NodeId) -> String {
        let state = &mut *self.state.borrow_mut();
        if state.nested == 0 || state.exclude.contains(&id) {
            return String::new();
        }
        let next = state.aliases.len();
        state
            .aliases
            .entry(id)
            .or_insert_with(|| {
                let name = alias(next);
                trace!(alias = %name, node = id.get(), "allocated alias");
                name
            })
            .clone()
    }

    /// Returns true if `id` already has an alias, without allocating one.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        let state = self.state.borrow();
        state.nested > 0 && !state.exclude.contains(&id) && state.aliases.contains_key(&id)
    }

    /// Forces `alias` onto `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::AliasAssigned`] if `id` already has an alias and
    /// [`SqlError::Invalid`] if no scope is open.
    pub fn set(&self, id: NodeId, alias: impl Into<String>) -> Result<()> {
        let state = &mut *self.state.borrow_mut();
        if state.nested == 0 {
            return Err(SqlError::invalid("alias scope", "no open scope"));
        }
        if let Some(existing) = state.aliases.get(&id) {
            return Err(SqlError::AliasAssigned {
                alias: existing.clone(),
            });
        }
        state.aliases.insert(id, alias.into());
        Ok(())
    }
}

/// Guard returned by [`AliasManager::enter`].
#[must_use = "the scope closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AliasScope<'a> {
    manager: &'a AliasManager,
}

impl Drop for AliasScope<'_> {
    fn drop(&mut self) {
        let mut state = self.manager.state.borrow_mut();
        state.nested = state.nested.saturating_sub(1);
        if state.nested == 0 {
            state.aliases.clear();
            state.exclude.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_sequence() {
        let first: Vec<String> = (0..6).map(alias).collect();
        assert_eq!(first, ["a", "b", "c", "d", "e", "f"]);
        let wrap: Vec<String> = (26..30).map(alias).collect();
        assert_eq!(wrap, ["ba", "bb", "bc", "bd"]);
        let powers: Vec<String> = (0..5).map(|n| alias(26_usize.pow(n))).collect();
        assert_eq!(powers, ["b", "ba", "baa", "baaa", "baaaa"]);
    }

    #[test]
    fn test_no_alias_outside_scope() {
        let manager = AliasManager::new();
        let id = NodeId::next();
        assert_eq!(manager.get(id), "");
        assert!(!manager.contains(id));
    }

    #[test]
    fn test_alias_is_stable_within_scope() {
        let manager = AliasManager::new();
        let (t1, t2) = (NodeId::next(), NodeId::next());
        let _scope = manager.enter();
        assert_eq!(manager.get(t1), "a");
        assert_eq!(manager.get(t2), "b");
        assert_eq!(manager.get(t1), "a");
        assert!(manager.contains(t2));
    }

    #[test]
    fn test_nested_scope_shares_table() {
        let manager = AliasManager::new();
        let (outer, inner) = (NodeId::next(), NodeId::next());
        let _scope = manager.enter();
        assert_eq!(manager.get(outer), "a");
        {
            let _nested = manager.enter();
            assert_eq!(manager.get(inner), "b");
            assert_eq!(manager.get(outer), "a");
        }
        assert_eq!(manager.get(inner), "b", "inner exit must not clear");
    }

    #[test]
    fn test_outermost_exit_clears() {
        let manager = AliasManager::new();
        let (t1, t2) = (NodeId::next(), NodeId::next());
        {
            let _scope = manager.enter();
            assert_eq!(manager.get(t1), "a");
        }
        assert!(!manager.is_active());
        let _scope = manager.enter();
        assert_eq!(manager.get(t2), "a");
    }

    #[test]
    fn test_excluded_items_have_no_alias() {
        let manager = AliasManager::new();
        let (target, other) = (NodeId::next(), NodeId::next());
        let _scope = manager.enter_excluding([target]);
        assert_eq!(manager.get(target), "");
        assert!(!manager.contains(target));
        assert_eq!(manager.get(other), "a");
    }

    #[test]
    fn test_set_rejects_second_alias() {
        let manager = AliasManager::new();
        let id = NodeId::next();
        let _scope = manager.enter();
        manager.set(id, "x").unwrap();
        assert_eq!(manager.get(id), "x");
        let err = manager.set(id, "y").unwrap_err();
        assert!(matches!(err, SqlError::AliasAssigned { alias } if alias == "x"));
    }

    #[test]
    fn test_set_requires_scope() {
        let manager = AliasManager::new();
        assert!(manager.set(NodeId::next(), "x").is_err());
    }
}
