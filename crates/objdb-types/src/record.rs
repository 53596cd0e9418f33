use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric reference to a record's schema class.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTag(pub u16);

impl fmt::Debug for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassTag({})", self.0)
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable reference to a field descriptor within a class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldIndex(pub u16);

impl fmt::Debug for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldIndex({})", self.0)
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A schema-tagged collection of encoded field values.
///
/// The record never holds a copy of a field's definition, only its index.
/// Values are opaque bytes already encoded by the schema layer. Fields are
/// kept in a `BTreeMap` so iteration (and therefore encoding) order is
/// ascending field index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub class_tag: ClassTag,
    pub fields: BTreeMap<FieldIndex, Vec<u8>>,
}

impl Record {
    /// Create a record with no fields.
    pub fn new(class_tag: ClassTag) -> Self {
        Self {
            class_tag,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion. A repeated index replaces the value.
    pub fn with_field(mut self, index: u16, value: impl Into<Vec<u8>>) -> Self {
        self.fields.insert(FieldIndex(index), value.into());
        self
    }

    /// Set a field, returning the previous value if any.
    pub fn set(&mut self, index: FieldIndex, value: Vec<u8>) -> Option<Vec<u8>> {
        self.fields.insert(index, value)
    }

    pub fn get(&self, index: FieldIndex) -> Option<&[u8]> {
        self.fields.get(&index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_replaces_duplicate_index() {
        let r = Record::new(ClassTag(3))
            .with_field(1, b"a".to_vec())
            .with_field(1, b"b".to_vec());
        assert_eq!(r.len(), 1);
        assert_eq!(r.get(FieldIndex(1)), Some(&b"b"[..]));
    }

    #[test]
    fn iteration_is_ascending_index() {
        let r = Record::new(ClassTag(1))
            .with_field(9, vec![9])
            .with_field(2, vec![2])
            .with_field(5, vec![5]);
        let order: Vec<u16> = r.fields.keys().map(|k| k.0).collect();
        assert_eq!(order, vec![2, 5, 9]);
    }

    #[test]
    fn empty_record() {
        let r = Record::new(ClassTag(0));
        assert!(r.is_empty());
        assert_eq!(r.get(FieldIndex(0)), None);
    }
}
