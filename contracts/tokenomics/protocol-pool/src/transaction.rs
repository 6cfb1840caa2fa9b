use std::collections::BTreeMap;

use cosmwasm_std::{DepsMut, Order, Record, Storage};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Delta {
    Set(Vec<u8>),
    Delete,
}

/// Write cache over a read-only parent. Reads see the cached writes; nothing
/// reaches the parent until [`PendingWrites::commit`].
pub struct StorageTransaction<'a> {
    parent: &'a dyn Storage,
    local: BTreeMap<Vec<u8>, Delta>,
}

impl<'a> StorageTransaction<'a> {
    pub fn new(parent: &'a dyn Storage) -> Self {
        StorageTransaction {
            parent,
            local: BTreeMap::new(),
        }
    }

    /// Releases the parent borrow and returns the pending writes.
    pub fn prepare(self) -> PendingWrites {
        PendingWrites(self.local)
    }
}

fn in_range(key: &[u8], start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    start.map_or(true, |s| key >= s) && end.map_or(true, |e| key < e)
}

impl Storage for StorageTransaction<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.local.get(key) {
            Some(Delta::Set(value)) => Some(value.clone()),
            Some(Delta::Delete) => None,
            None => self.parent.get(key),
        }
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.range(start, end, Order::Ascending).collect();
        for (key, delta) in self
            .local
            .iter()
            .filter(|(k, _)| in_range(k, start, end))
        {
            match delta {
                Delta::Set(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Delta::Delete => {
                    merged.remove(key);
                }
            }
        }
        match order {
            Order::Ascending => Box::new(merged.into_iter()),
            Order::Descending => Box::new(merged.into_iter().rev()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.local.insert(key.to_vec(), Delta::Set(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        self.local.insert(key.to_vec(), Delta::Delete);
    }
}

pub struct PendingWrites(BTreeMap<Vec<u8>, Delta>);

impl PendingWrites {
    pub fn commit(self, storage: &mut dyn Storage) {
        for (key, delta) in self.0 {
            match delta {
                Delta::Set(value) => storage.set(&key, &value),
                Delta::Delete => storage.remove(&key),
            }
        }
    }
}

/// Runs `action` against a write cache and commits it only if the action
/// succeeds, so an error leaves the underlying storage untouched.
pub fn transactional<T, E, F>(deps: DepsMut, action: F) -> Result<T, E>
where
    F: FnOnce(DepsMut) -> Result<T, E>,
{
    let DepsMut {
        storage,
        api,
        querier,
    } = deps;
    let mut cache = StorageTransaction::new(&*storage);
    let result = action(DepsMut {
        storage: &mut cache,
        api,
        querier,
    })?;
    cache.prepare().commit(storage);
    Ok(result)
}
