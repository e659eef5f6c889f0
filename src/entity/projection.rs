use super::record::Record;
use super::secured::SecuredRecord;

/// Read-only view of the audit columns, for query paths that do not load a full entity.
pub trait Projection<I> {
    fn id(&self) -> Option<&I>;
    fn created_time(&self) -> i64;
    fn updated_time(&self) -> i64;
    fn created_date(&self) -> &str;
    fn updated_date(&self) -> &str;
    fn created_by_id(&self) -> &I;
    fn updated_by_id(&self) -> Option<&I>;
}

pub trait SecuredProjection<I>: Projection<I> {
    fn is_deleted(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_expired(&self) -> bool;
    fn is_locked(&self) -> bool;
}

impl<I> Projection<I> for Record<I> {
    fn id(&self) -> Option<&I> {
        self.id.as_ref()
    }

    fn created_time(&self) -> i64 {
        Record::created_time(self)
    }

    fn updated_time(&self) -> i64 {
        self.updated_time
    }

    fn created_date(&self) -> &str {
        Record::created_date(self)
    }

    fn updated_date(&self) -> &str {
        &self.updated_date
    }

    fn created_by_id(&self) -> &I {
        Record::created_by_id(self)
    }

    fn updated_by_id(&self) -> Option<&I> {
        self.updated_by_id.as_ref()
    }
}

impl<I> Projection<I> for SecuredRecord<I> {
    fn id(&self) -> Option<&I> {
        Projection::id(&self.record)
    }

    fn created_time(&self) -> i64 {
        Projection::created_time(&self.record)
    }

    fn updated_time(&self) -> i64 {
        self.record.updated_time
    }

    fn created_date(&self) -> &str {
        Projection::created_date(&self.record)
    }

    fn updated_date(&self) -> &str {
        &self.record.updated_date
    }

    fn created_by_id(&self) -> &I {
        Projection::created_by_id(&self.record)
    }

    fn updated_by_id(&self) -> Option<&I> {
        self.record.updated_by_id.as_ref()
    }
}

impl<I> SecuredProjection<I> for SecuredRecord<I> {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_expired(&self) -> bool {
        self.is_expired
    }

    fn is_locked(&self) -> bool {
        self.is_locked
    }
}
