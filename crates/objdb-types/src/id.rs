use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a stored object.
///
/// Identifiers are small integers drawn from a bounded [`IdRange`]. The value
/// `0` is reserved as the "no identifier" sentinel and is never issued, so an
/// `ObjectId` read back from a ledger or a blob name is always checked with
/// [`ObjectId::is_reserved`] before use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// The reserved sentinel value.
    pub const RESERVED: ObjectId = ObjectId(0);

    /// Wrap a raw value. No range check is performed.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` for the reserved sentinel.
    pub const fn is_reserved(self) -> bool {
        self.0 == 0
    }

    /// Name of the blob holding this object's record.
    pub fn blob_name(self) -> String {
        format!("{}.dat", self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u32 = s
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| TypeError::InvalidId(format!("{s:?}: {e}")))?;
        if raw == 0 {
            return Err(TypeError::ReservedId);
        }
        Ok(Self(raw))
    }
}

/// Inclusive range of issuable identifiers.
///
/// Construction guarantees `1 <= min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    min: u32,
    max: u32,
}

impl IdRange {
    /// Validate and build a range.
    pub fn new(min: u32, max: u32) -> Result<Self, TypeError> {
        if min == 0 {
            return Err(TypeError::ReservedId);
        }
        if min > max {
            return Err(TypeError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> ObjectId {
        ObjectId(self.min)
    }

    pub fn max(&self) -> ObjectId {
        ObjectId(self.max)
    }

    /// Whether `id` lies inside the range. The reserved id never does.
    pub fn contains(&self, id: ObjectId) -> bool {
        id.0 >= self.min && id.0 <= self.max
    }

    /// Number of identifiers in the range.
    pub fn count(&self) -> u64 {
        u64::from(self.max) - u64::from(self.min) + 1
    }

    /// The counter value once every identifier has been issued once.
    pub fn exhausted_counter(&self) -> u64 {
        u64::from(self.max) + 1
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
