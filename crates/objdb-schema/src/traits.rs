//! The [`SchemaRegistry`] trait.

use objdb_types::ClassTag;

use crate::types::ClassDescriptor;

/// Resolves class tags to class descriptors.
///
/// Implementations must be thread-safe and their answers must be stable for
/// the lifetime of a store: a tag that resolved once must keep resolving to
/// a class with the same field indices, or previously written records become
/// unreadable.
pub trait SchemaRegistry: Send + Sync {
    /// Look up a class by tag. Returns `None` if the tag is unknown.
    fn resolve_class(&self, tag: ClassTag) -> Option<&ClassDescriptor>;

    /// All known class tags in ascending order.
    fn class_tags(&self) -> Vec<ClassTag>;
}
