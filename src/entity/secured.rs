use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::record::{Entity, Record, RecordOptions};

/// Account-style status flags. The flags are independent of each other;
/// what combinations mean is up to the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFlags {
    pub deleted: bool,
    pub active: bool,
    pub expired: bool,
    pub locked: bool,
}

impl SecurityFlags {
    /// Flags for a freshly created, usable record
    pub fn active() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }
}

/// A [`Record`] with soft-delete and account status flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SecuredRecord<I> {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: Record<I>,
    pub is_deleted: bool,
    pub is_active: bool,
    pub is_expired: bool,
    pub is_locked: bool,
}

impl<I> SecuredRecord<I> {
    pub fn new(options: RecordOptions<I>, flags: SecurityFlags) -> Self {
        Self {
            record: Record::new(options),
            is_deleted: flags.deleted,
            is_active: flags.active,
            is_expired: flags.expired,
            is_locked: flags.locked,
        }
    }

    pub fn flags(&self) -> SecurityFlags {
        SecurityFlags {
            deleted: self.is_deleted,
            active: self.is_active,
            expired: self.is_expired,
            locked: self.is_locked,
        }
    }
}

impl<I> Entity<I> for SecuredRecord<I> {
    fn record(&self) -> &Record<I> {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record<I> {
        &mut self.record
    }
}
