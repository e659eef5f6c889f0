//! Conversions from request payloads (plus whatever context they need) into
//! entities. One trait per arity; implement the one that fits.

/// Converts the implementor itself into an entity
pub trait EntityMapper<E> {
    fn to_entity(&self) -> E;
}

pub trait SingleArgsEntityMapper<E, A> {
    fn to_entity(&self, a: A) -> E;
}

pub trait DoubleArgsEntityMapper<E, A, B> {
    fn to_entity(&self, a: A, b: B) -> E;
}

pub trait TripleArgsEntityMapper<E, A, B, C> {
    fn to_entity(&self, a: A, b: B, c: C) -> E;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Record, RecordOptions};

    struct Tag {
        label: String,
    }

    #[derive(Debug)]
    struct TagEntity {
        record: Record<i64>,
        label: String,
    }

    struct TagMapper;

    impl DoubleArgsEntityMapper<TagEntity, &Tag, i64> for TagMapper {
        fn to_entity(&self, tag: &Tag, actor: i64) -> TagEntity {
            TagEntity {
                record: Record::new(RecordOptions::created_by(actor)),
                label: tag.label.to_lowercase(),
            }
        }
    }

    impl TripleArgsEntityMapper<TagEntity, &Tag, i64, i64> for TagMapper {
        fn to_entity(&self, tag: &Tag, actor: i64, created_time: i64) -> TagEntity {
            TagEntity {
                record: Record::new(RecordOptions::created_by(actor).created_time(created_time)),
                label: tag.label.clone(),
            }
        }
    }

    impl EntityMapper<String> for Tag {
        fn to_entity(&self) -> String {
            self.label.clone()
        }
    }

    #[test]
    fn test_mappers_build_entities() {
        let tag = Tag { label: "Rust".into() };

        let entity = DoubleArgsEntityMapper::to_entity(&TagMapper, &tag, 5);
        assert_eq!(entity.label, "rust");
        assert_eq!(*entity.record.created_by_id(), 5);

        let dated = TripleArgsEntityMapper::to_entity(&TagMapper, &tag, 5, 0);
        assert_eq!(dated.record.created_date(), "1970-01-01T00:00:00.000Z");

        assert_eq!(EntityMapper::to_entity(&tag), "Rust");
    }
}
