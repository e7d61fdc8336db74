use std::collections::HashMap;


/// Write applied by a replica but not yet committed.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "{}={}", key, value)]
pub struct PendingWrite {
    pub key: String,
    pub value: String,
}

/// Two-phase key-value map. Writes land in `pending` under their op_id and
/// become visible to reads only once committed.
#[derive(Clone, Debug, Default)]
pub struct ReplicatedStore {
    committed: HashMap<String, String>,
    pending: HashMap<String, PendingWrite>,
}

impl ReplicatedStore {
    pub fn new() -> ReplicatedStore {
        ReplicatedStore::default()
    }

    /// Inserts or overwrites the pending slot of `op_id`.
    pub fn apply(&mut self, op_id: &str, key: &str, value: &str) {
        if op_id.is_empty() || key.is_empty() {
            warn!("Store: ignoring malformed write op_id='{}' key='{}'", op_id, key);
            return;
        }

        let write = PendingWrite {
            key: key.to_string(),
            value: value.to_string(),
        };
        trace!("Store: applied {} as pending {}", write, op_id);
        self.pending.insert(op_id.to_string(), write);
    }

    /// Moves the pending write of `op_id` into the committed map. Unknown or
    /// already committed op_ids are a no-op. Returns whether a write moved.
    pub fn commit(&mut self, op_id: &str) -> bool {
        match self.pending.remove(op_id) {
            Some(write) => {
                trace!("Store: committed {} ({})", op_id, write);
                self.committed.insert(write.key, write.value);
                true
            }
            None => false,
        }
    }

    /// Reads the committed value of `key`. Pending writes are never observed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.committed.get(key).map(String::as_str)
    }

    pub fn is_pending(&self, op_id: &str) -> bool {
        self.pending.contains_key(op_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
