//! Query predicates
//!
//! Match-all, field equality, field comparison and reference equality. No
//! boolean composition.

use std::cmp::Ordering;

use crate::record::{GenericRecord, RecordId, RecordValue};

/// Comparison operators for [`Predicate::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

/// Boolean filter over a single record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Equals { field: String, value: RecordValue },
    Compare { field: String, op: Comparison, value: RecordValue },
    /// Field holds a reference (or reference list entry) to `id`
    ReferenceEquals { field: String, id: RecordId },
}

impl Predicate {
    pub fn all() -> Self {
        Predicate::All
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<RecordValue>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn reference_eq(field: impl Into<String>, id: RecordId) -> Self {
        Predicate::ReferenceEquals {
            field: field.into(),
            id,
        }
    }

    /// Evaluate against a record. Missing fields never match.
    pub fn matches(&self, record: &GenericRecord) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { field, value } => match record.get(field) {
                Some(actual) => actual == value || actual.compare(value) == Some(Ordering::Equal),
                None => false,
            },
            Predicate::Compare { field, op, value } => {
                let Some(ordering) = record.get(field).and_then(|actual| actual.compare(value))
                else {
                    return false;
                };
                match op {
                    Comparison::NotEqual => ordering != Ordering::Equal,
                    Comparison::Less => ordering == Ordering::Less,
                    Comparison::LessOrEqual => ordering != Ordering::Greater,
                    Comparison::Greater => ordering == Ordering::Greater,
                    Comparison::GreaterOrEqual => ordering != Ordering::Less,
                }
            }
            Predicate::ReferenceEquals { field, id } => record
                .get(field)
                .is_some_and(|value| value.references().iter().any(|r| &r.id == id)),
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Reference;

    fn task(title: &str, priority: i64, parent: Option<&str>) -> GenericRecord {
        let mut record = GenericRecord::new("Task");
        record.set("title", RecordValue::from(title));
        record.set("priority", RecordValue::Int(priority));
        if let Some(parent) = parent {
            record.set("parent", RecordValue::Reference(Reference::link(RecordId::new(parent))));
        }
        record
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Predicate::all().matches(&task("a", 1, None)));
        assert_eq!(Predicate::default(), Predicate::All);
    }

    #[test]
    fn test_field_equality() {
        let record = task("a", 1, None);
        assert!(Predicate::field_eq("title", "a").matches(&record));
        assert!(!Predicate::field_eq("title", "b").matches(&record));
        assert!(!Predicate::field_eq("missing", "a").matches(&record));
        // Numeric equality crosses int/double
        assert!(Predicate::field_eq("priority", 1.0).matches(&record));
    }

    #[test]
    fn test_comparisons() {
        let record = task("a", 5, None);
        assert!(Predicate::compare("priority", Comparison::Greater, 3i64).matches(&record));
        assert!(Predicate::compare("priority", Comparison::GreaterOrEqual, 5i64).matches(&record));
        assert!(Predicate::compare("priority", Comparison::LessOrEqual, 5i64).matches(&record));
        assert!(!Predicate::compare("priority", Comparison::Less, 5i64).matches(&record));
        assert!(Predicate::compare("priority", Comparison::NotEqual, 4i64).matches(&record));
        // Incomparable types never match
        assert!(!Predicate::compare("title", Comparison::NotEqual, 4i64).matches(&record));
    }

    #[test]
    fn test_reference_equality() {
        let child = task("c", 1, Some("p1"));
        assert!(Predicate::reference_eq("parent", RecordId::new("p1")).matches(&child));
        assert!(!Predicate::reference_eq("parent", RecordId::new("p2")).matches(&child));
        assert!(!Predicate::reference_eq("parent", RecordId::new("p1")).matches(&task("r", 1, None)));
    }
}
