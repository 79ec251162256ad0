use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use crate::users::repo_types::{UserChanges, UserId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user does not exist")]
    NotFound,
    #[error("user with this id already exists")]
    DuplicateId,
    #[error("user with this username already exists")]
    DuplicateUsername,
}

#[derive(Default)]
struct Indexes {
    // insertion order, drives pagination
    order: Vec<UserId>,
    by_id: HashMap<UserId, UserRecord>,
    by_username: HashMap<String, UserId>,
}

/// In-memory user collection indexed by id and by username.
///
/// All three structures sit behind one lock so they can never disagree:
/// writers take it exclusively for the whole operation, readers share it.
pub struct UserStore {
    inner: RwLock<Indexes>,
}

impl UserStore {
    /// Creates a store holding only the given administrator.
    pub fn new(mut admin: UserRecord) -> Self {
        admin.admin = true;
        let mut idx = Indexes::default();
        idx.order.push(admin.id);
        idx.by_username.insert(admin.username.clone(), admin.id);
        idx.by_id.insert(admin.id, admin);
        Self {
            inner: RwLock::new(idx),
        }
    }

    // Mutations check everything before touching the maps, so a poisoned
    // lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Indexes> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut idx = self.write();
        if idx.by_id.contains_key(&record.id) {
            return Err(StoreError::DuplicateId);
        }
        if idx.by_username.contains_key(&record.username) {
            return Err(StoreError::DuplicateUsername);
        }

        debug!(user_id = %record.id, username = %record.username, "user stored");
        idx.order.push(record.id);
        idx.by_username.insert(record.username.clone(), record.id);
        idx.by_id.insert(record.id, record);
        Ok(())
    }

    pub fn get_by_id(&self, id: UserId) -> Result<UserRecord, StoreError> {
        self.read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn get_by_username(&self, username: &str) -> Result<UserRecord, StoreError> {
        let idx = self.read();
        idx.by_username
            .get(username)
            .and_then(|id| idx.by_id.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Read-locked snapshot; `count` and `list` on one view always agree.
    pub fn view(&self) -> UserView<'_> {
        UserView { idx: self.read() }
    }

    pub fn update(&self, id: UserId, changes: UserChanges) -> Result<(), StoreError> {
        let mut idx = self.write();
        let old_username = idx
            .by_id
            .get(&id)
            .map(|r| r.username.clone())
            .ok_or(StoreError::NotFound)?;

        let renamed_to = changes
            .username
            .as_ref()
            .filter(|name| **name != old_username)
            .cloned();
        if let Some(new_username) = &renamed_to {
            if idx.by_username.contains_key(new_username) {
                return Err(StoreError::DuplicateUsername);
            }
        }

        if let Some(record) = idx.by_id.get_mut(&id) {
            changes.apply(record);
        }
        if let Some(new_username) = renamed_to {
            idx.by_username.remove(&old_username);
            idx.by_username.insert(new_username, id);
        }
        debug!(user_id = %id, "user updated");
        Ok(())
    }

    pub fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut idx = self.write();
        let record = idx.by_id.remove(&id).ok_or(StoreError::NotFound)?;
        idx.by_username.remove(&record.username);
        idx.order.retain(|existing| *existing != id);
        debug!(user_id = %id, username = %record.username, "user deleted");
        Ok(())
    }
}

pub struct UserView<'a> {
    idx: RwLockReadGuard<'a, Indexes>,
}

impl UserView<'_> {
    /// Records in insertion order starting at `offset`; empty once past the end.
    pub fn list(&self, offset: usize, limit: usize) -> Vec<UserRecord> {
        self.idx
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.idx.by_id.get(id).cloned())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.idx.order.len()
    }
}
