use std::cell::RefCell;
use std::rc::Rc;

use crate::core::record::{Record, RecordFields, RecordId};
use crate::store::{RecordStore, StoreError};

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    next_id: i64,
    simulate_write_error: bool,
    simulate_list_error: bool,
}

/// In-memory record store.
///
/// Clones share the same records, so a test can keep a handle after moving
/// the store into a model. Uses `Rc<RefCell<_>>` since access is
/// single-threaded. Ids come from a counter and are never reused. SQLite
/// without `AUTOINCREMENT` differs here: it hands out max(rowid) + 1, so the
/// id of a deleted highest row comes back.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for exercising error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.inner.borrow_mut().simulate_write_error = simulate;
    }

    /// Make `list` fail, for exercising a list refresh that breaks.
    pub fn set_simulate_list_error(&self, simulate: bool) {
        self.inner.borrow_mut().simulate_list_error = simulate;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.inner.borrow().simulate_write_error {
            return Err(StoreError::Unavailable("simulated write error".to_string()));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn create(&mut self, fields: &RecordFields) -> Result<RecordId, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = RecordId(inner.next_id);
        inner.records.push(Record::persisted(id, fields.clone()));
        Ok(id)
    }

    fn read(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let inner = self.inner.borrow();
        Ok(inner.records.iter().find(|r| r.id == Some(id)).cloned())
    }

    fn update(&mut self, id: RecordId, fields: &RecordFields) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.borrow_mut();
        match inner.records.iter_mut().find(|r| r.id == Some(id)) {
            Some(record) => {
                record.fields = fields.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: RecordId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.borrow_mut().records.retain(|r| r.id != Some(id));
        Ok(())
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        let inner = self.inner.borrow();
        if inner.simulate_list_error {
            return Err(StoreError::Unavailable("simulated list error".to_string()));
        }
        Ok(inner.records.clone())
    }
}
