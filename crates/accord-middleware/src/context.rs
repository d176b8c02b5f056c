//! Request-scoped middleware context.
//!
//! A [`MiddlewareContext`] lives for exactly one request. Besides the
//! request id and timing it carries the validation error flag: once any
//! stage rejects the request or the reply, later stages leave the produced
//! error untouched.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use uuid::Uuid;

/// Unique identifier for a request (UUID v7, time ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Context shared by every stage handling one request.
pub struct MiddlewareContext {
    request_id: RequestId,
    started_at: Instant,
    validation_failed: bool,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context for an existing request id.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            validation_failed: false,
            extensions: HashMap::new(),
        }
    }

    /// The request id.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// When processing started.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time since processing started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Sets the validation error flag. The flag never resets.
    pub fn mark_validation_failed(&mut self) {
        self.validation_failed = true;
    }

    /// Whether a stage already produced a validation error reply.
    #[must_use]
    pub fn validation_failed(&self) -> bool {
        self.validation_failed
    }

    /// Stores a typed extension, replacing any previous value of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns a typed extension.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("validation_failed", &self.validation_failed)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
        assert_eq!(RequestId::new().as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_validation_flag_is_sticky() {
        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.validation_failed());
        ctx.mark_validation_failed();
        ctx.mark_validation_failed();
        assert!(ctx.validation_failed());
    }

    #[test]
    fn test_extensions() {
        let mut ctx = MiddlewareContext::new();
        ctx.set_extension(42u32);
        ctx.set_extension("route".to_string());

        assert_eq!(ctx.get_extension::<u32>(), Some(&42));
        assert_eq!(ctx.remove_extension::<String>(), Some("route".to_string()));
        assert!(ctx.get_extension::<String>().is_none());
    }
}
