//! Generic method closing
//!
//! Maps an open generic method plus concrete type arguments to the closed
//! method. Results are memoized so every call with the same arguments sees
//! the same closed descriptor.

use std::sync::Arc;

use dashmap::DashMap;
use interpose_types::{MethodDescriptor, MethodId, TypeError, TypeRef};

/// Memo of closed generic methods, scoped to one proxy type
#[derive(Debug, Default)]
pub struct GenericMethodCache {
    closed: DashMap<(MethodId, Vec<TypeRef>), Arc<MethodDescriptor>>,
}

impl GenericMethodCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Close `open` over `type_args`.
    ///
    /// Non-generic methods called without type arguments are returned as-is.
    pub fn close(
        &self,
        open: &Arc<MethodDescriptor>,
        type_args: &[TypeRef],
    ) -> Result<Arc<MethodDescriptor>, TypeError> {
        if type_args.is_empty() && !open.is_generic_method_definition() {
            return Ok(Arc::clone(open));
        }

        let key = (open.id(), type_args.to_vec());
        if let Some(hit) = self.closed.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }

        let closed = Arc::new(open.close_method(type_args)?);
        // a racing caller may have published first; everyone keeps that one
        let entry = self.closed.entry(key).or_insert(closed);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of memoized closings
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    /// Check for no memoized closings
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }
}
