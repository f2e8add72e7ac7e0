//! # Record Model
//!
//! CRUD over the store plus the operations the list screen needs
//! (most-recent-first summaries, duplicate). Validation is the caller's job:
//! nothing here refuses a record for having empty fields.

use chrono::NaiveDate;
use log::{debug, info};
use thiserror::Error;

use crate::core::record::{Record, RecordFields, RecordId, Summary, today};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("record {0} no longer exists")]
    NotFound(RecordId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the store handle for the lifetime of the session.
///
/// The handle is opened in `main`, moved in here, and closed when the model
/// is dropped on exit.
pub struct RecordModel {
    store: Box<dyn RecordStore>,
    clock: fn() -> NaiveDate,
}

impl RecordModel {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self::with_clock(store, today)
    }

    pub fn with_clock(store: Box<dyn RecordStore>, clock: fn() -> NaiveDate) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn create(&mut self, fields: &RecordFields) -> Result<RecordId, ModelError> {
        let id = self.store.create(fields)?;
        info!("Created record {} ({})", id, fields.name);
        Ok(id)
    }

    pub fn read(&self, id: RecordId) -> Result<Record, ModelError> {
        self.store.read(id)?.ok_or(ModelError::NotFound(id))
    }

    pub fn update(&mut self, id: RecordId, fields: &RecordFields) -> Result<(), ModelError> {
        if self.store.update(id, fields)? {
            info!("Updated record {}", id);
            Ok(())
        } else {
            Err(ModelError::NotFound(id))
        }
    }

    /// Deleting an id that is already gone succeeds.
    pub fn delete(&mut self, id: RecordId) -> Result<(), ModelError> {
        self.store.delete(id)?;
        info!("Deleted record {}", id);
        Ok(())
    }

    /// Newest `reference_date` first; records sharing a date list the most
    /// recently inserted first.
    pub fn list_summaries(&self) -> Result<Vec<Summary>, ModelError> {
        let mut summaries: Vec<Summary> = self
            .store
            .list()?
            .iter()
            .filter_map(Record::summary)
            .collect();
        summaries.sort_by(|a, b| {
            b.reference_date
                .cmp(&a.reference_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        debug!("Listed {} summaries", summaries.len());
        Ok(summaries)
    }

    /// Persist a copy of `id` dated today and return the new id.
    pub fn duplicate(&mut self, id: RecordId) -> Result<RecordId, ModelError> {
        let source = self.read(id)?;
        let fields = RecordFields {
            reference_date: self.today(),
            ..source.fields
        };
        let new_id = self.store.create(&fields)?;
        info!("Duplicated record {} as {}", id, new_id);
        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{date, fixed_today, sample_fields};

    fn model() -> RecordModel {
        RecordModel::with_clock(Box::new(MemoryStore::new()), fixed_today)
    }

    #[test]
    fn test_create_then_read_round_trips() {
        let mut model = model();
        let fields = sample_fields("Ana Lee");
        let id = model.create(&fields).unwrap();
        let record = model.read(id).unwrap();
        assert_eq!(record.id, Some(id));
        assert_eq!(record.fields, fields);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let model = model();
        assert!(matches!(
            model.read(RecordId(3)),
            Err(ModelError::NotFound(RecordId(3)))
        ));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut model = model();
        let result = model.update(RecordId(3), &sample_fields("x"));
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_delete_twice_is_fine() {
        let mut model = model();
        let id = model.create(&sample_fields("Ana Lee")).unwrap();
        model.delete(id).unwrap();
        model.delete(id).unwrap();
        assert!(model.list_summaries().unwrap().is_empty());
    }

    #[test]
    fn test_summaries_newest_date_first() {
        let mut model = model();
        let mut older = sample_fields("Older");
        older.reference_date = date(2021, 1, 1);
        let mut newer = sample_fields("Newer");
        newer.reference_date = date(2022, 6, 1);
        model.create(&older).unwrap();
        model.create(&newer).unwrap();

        let names: Vec<String> = model
            .list_summaries()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_summaries_same_date_latest_insert_first() {
        let mut model = model();
        let first = model.create(&sample_fields("First")).unwrap();
        let second = model.create(&sample_fields("Second")).unwrap();

        let ids: Vec<RecordId> = model
            .list_summaries()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_duplicate_resets_date_and_id() {
        let mut model = model();
        let mut fields = sample_fields("Ana Lee");
        fields.reference_date = date(2020, 9, 1);
        fields.end_year = Some(2022);
        let id = model.create(&fields).unwrap();

        let copy_id = model.duplicate(id).unwrap();
        assert_ne!(copy_id, id);

        let copy = model.read(copy_id).unwrap();
        assert_eq!(copy.fields.reference_date, fixed_today());
        assert_eq!(
            RecordFields {
                reference_date: fields.reference_date,
                ..copy.fields
            },
            fields
        );
    }

    #[test]
    fn test_duplicate_missing_source() {
        let mut model = model();
        assert!(matches!(
            model.duplicate(RecordId(1)),
            Err(ModelError::NotFound(_))
        ));
    }
}
