use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::util::date::{display_date, now_millis};

/// Construction options for a [`Record`].
///
/// Timestamps default to the current time; only the creating actor is required.
#[derive(Debug, Clone)]
pub struct RecordOptions<I> {
    pub created_time: Option<i64>,
    pub updated_time: Option<i64>,
    pub created_by_id: I,
    pub updated_by_id: Option<I>,
}

impl<I> RecordOptions<I> {
    pub fn created_by(created_by_id: I) -> Self {
        Self {
            created_time: None,
            updated_time: None,
            created_by_id,
            updated_by_id: None,
        }
    }

    pub fn created_time(mut self, millis: i64) -> Self {
        self.created_time = Some(millis);
        self
    }

    pub fn updated_time(mut self, millis: i64) -> Self {
        self.updated_time = Some(millis);
        self
    }

    pub fn updated_by(mut self, updated_by_id: I) -> Self {
        self.updated_by_id = Some(updated_by_id);
        self
    }
}

/// Identity and audit columns shared by every persisted resource.
///
/// Creation fields are fixed at construction. Update fields are public and
/// rewritten by the owning service on each mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Record<I> {
    pub id: Option<I>,
    created_time: i64,
    pub updated_time: i64,
    created_date: String,
    pub updated_date: String,
    created_by_id: I,
    pub updated_by_id: Option<I>,
}

impl<I> Record<I> {
    pub fn new(options: RecordOptions<I>) -> Self {
        let created_time = options.created_time.unwrap_or_else(now_millis);
        let updated_time = options.updated_time.unwrap_or_else(now_millis);

        Self {
            id: None,
            created_time,
            updated_time,
            created_date: display_date(created_time).unwrap_or_default(),
            updated_date: display_date(updated_time).unwrap_or_default(),
            created_by_id: options.created_by_id,
            updated_by_id: options.updated_by_id,
        }
    }

    pub fn created_time(&self) -> i64 {
        self.created_time
    }

    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn created_by_id(&self) -> &I {
        &self.created_by_id
    }

    /// Set the update timestamp and refresh its display string
    pub fn set_updated_time(&mut self, millis: i64) {
        self.updated_time = millis;
        self.updated_date = display_date(millis).unwrap_or_default();
    }
}

/// A persisted resource carrying an embedded [`Record`].
pub trait Entity<I> {
    fn record(&self) -> &Record<I>;
    fn record_mut(&mut self) -> &mut Record<I>;

    fn id(&self) -> Option<&I> {
        self.record().id.as_ref()
    }
}

impl<I> Entity<I> for Record<I> {
    fn record(&self) -> &Record<I> {
        self
    }

    fn record_mut(&mut self) -> &mut Record<I> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_created_time_derives_date() {
        let record = Record::new(RecordOptions::created_by(7_i64).created_time(0).updated_time(0));

        assert_eq!(record.created_time(), 0);
        assert_eq!(record.created_date(), "1970-01-01T00:00:00.000Z");
        assert_eq!(record.created_date(), display_date(0).unwrap());
        assert_eq!(*record.created_by_id(), 7);
        assert_eq!(record.updated_by_id, None);
        assert_eq!(record.id, None);
    }

    #[test]
    fn test_defaults_to_now() {
        let before = now_millis();
        let record = Record::new(RecordOptions::created_by("admin".to_string()));
        let after = now_millis();

        assert!(record.created_time() >= before && record.created_time() <= after);
        assert!(record.updated_time >= before && record.updated_time <= after);
        assert!(!record.created_date().is_empty());
    }

    #[test]
    fn test_set_updated_time_keeps_creation_fields() {
        let mut record = Record::new(RecordOptions::created_by(1_i64).created_time(1_000));
        record.set_updated_time(2_000);
        record.updated_by_id = Some(2);

        assert_eq!(record.updated_date, "1970-01-01T00:00:02.000Z");
        assert_eq!(record.created_time(), 1_000);
        assert_eq!(record.created_date(), "1970-01-01T00:00:01.000Z");
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = Record::new(RecordOptions::created_by(1_i64).created_time(0).updated_time(0));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["createdTime"], 0);
        assert_eq!(json["createdById"], 1);
        assert!(json["updatedById"].is_null());
        assert_eq!(json["createdDate"], "1970-01-01T00:00:00.000Z");
    }
}
