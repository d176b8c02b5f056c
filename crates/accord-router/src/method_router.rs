//! Per-path method dispatch.
//!
//! [`MethodRouter`] holds one value per HTTP method for a single path
//! template. The first registration for a method wins; later ones are
//! reported as duplicates and dropped.

use http::Method;

/// Maps HTTP methods to values for one route template.
///
/// # Example
///
/// ```rust
/// use accord_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new().get("listUsers").post("createUser");
///
/// assert_eq!(router.at(&Method::GET), Some(&"listUsers"));
/// assert_eq!(router.at(&Method::DELETE), None);
/// assert_eq!(router.allow_header(), "GET, POST");
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<T>,
    post: Option<T>,
    put: Option<T>,
    delete: Option<T>,
    patch: Option<T>,
    head: Option<T>,
    options: Option<T>,
    trace: Option<T>,
    connect: Option<T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
            trace: None,
            connect: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET value.
    #[must_use]
    pub fn get(self, value: T) -> Self {
        self.method(&Method::GET, value)
    }

    /// Registers a POST value.
    #[must_use]
    pub fn post(self, value: T) -> Self {
        self.method(&Method::POST, value)
    }

    /// Registers a PUT value.
    #[must_use]
    pub fn put(self, value: T) -> Self {
        self.method(&Method::PUT, value)
    }

    /// Registers a PATCH value.
    #[must_use]
    pub fn patch(self, value: T) -> Self {
        self.method(&Method::PATCH, value)
    }

    /// Registers a DELETE value.
    #[must_use]
    pub fn delete(self, value: T) -> Self {
        self.method(&Method::DELETE, value)
    }

    /// Registers a value for `method`, builder style.
    #[must_use]
    pub fn method(mut self, method: &Method, value: T) -> Self {
        self.insert(method, value);
        self
    }

    /// Registers a value for `method`.
    ///
    /// Returns `false` if the method already had a value (kept) or is not a
    /// standard method (dropped).
    pub fn insert(&mut self, method: &Method, value: T) -> bool {
        match self.slot_mut(method) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value);
                true
            }
            _ => false,
        }
    }

    /// The value registered for `method`.
    #[must_use]
    pub fn at(&self, method: &Method) -> Option<&T> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::HEAD => self.head.as_ref(),
            Method::OPTIONS => self.options.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            Method::CONNECT => self.connect.as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<T>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            Method::TRACE => Some(&mut self.trace),
            Method::CONNECT => Some(&mut self.connect),
            _ => None,
        }
    }

    /// Moves the values of `other` into methods that are still free.
    ///
    /// Returns how many of `other`'s values were dropped as duplicates.
    pub fn merge(&mut self, other: MethodRouter<T>) -> usize {
        let mut dropped = 0;
        for (method, value) in other.into_entries() {
            if !self.insert(&method, value) {
                dropped += 1;
            }
        }
        dropped
    }

    fn into_entries(self) -> impl Iterator<Item = (Method, T)> {
        [
            (Method::GET, self.get),
            (Method::POST, self.post),
            (Method::PUT, self.put),
            (Method::DELETE, self.delete),
            (Method::PATCH, self.patch),
            (Method::HEAD, self.head),
            (Method::OPTIONS, self.options),
            (Method::TRACE, self.trace),
            (Method::CONNECT, self.connect),
        ]
        .into_iter()
        .filter_map(|(method, value)| value.map(|v| (method, v)))
    }

    /// Returns true if any method has a value.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.allowed_methods().is_empty()
    }

    /// Methods with a value, in a fixed order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        [
            (Method::GET, self.get.is_some()),
            (Method::POST, self.post.is_some()),
            (Method::PUT, self.put.is_some()),
            (Method::DELETE, self.delete.is_some()),
            (Method::PATCH, self.patch.is_some()),
            (Method::HEAD, self.head.is_some()),
            (Method::OPTIONS, self.options.is_some()),
            (Method::TRACE, self.trace.is_some()),
            (Method::CONNECT, self.connect.is_some()),
        ]
        .into_iter()
        .filter_map(|(method, set)| set.then_some(method))
        .collect()
    }

    /// Value for an `Allow` header, e.g. `"GET, POST"`.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.allowed_methods()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_per_method() {
        let router = MethodRouter::new()
            .get(1)
            .post(2)
            .put(3)
            .patch(4)
            .delete(5)
            .method(&Method::HEAD, 6);

        assert_eq!(router.at(&Method::GET), Some(&1));
        assert_eq!(router.at(&Method::PATCH), Some(&4));
        assert_eq!(router.at(&Method::HEAD), Some(&6));
        assert_eq!(router.at(&Method::OPTIONS), None);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut router = MethodRouter::new().get("first");
        assert!(!router.insert(&Method::GET, "second"));
        assert_eq!(router.at(&Method::GET), Some(&"first"));
    }

    #[test]
    fn test_nonstandard_methods_are_dropped() {
        let mut router = MethodRouter::new();
        let purge = Method::from_bytes(b"PURGE").unwrap();
        assert!(!router.insert(&purge, ()));
        assert!(!router.has_any_method());
        assert_eq!(router.at(&purge), None);
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut router = MethodRouter::new().get("originalGet");
        let dropped = router.merge(MethodRouter::new().get("newGet").post("createUser"));

        assert_eq!(dropped, 1);
        assert_eq!(router.at(&Method::GET), Some(&"originalGet"));
        assert_eq!(router.at(&Method::POST), Some(&"createUser"));
    }

    #[test]
    fn test_allowed_methods_and_header() {
        let router = MethodRouter::new().delete(()).get(()).post(());
        assert_eq!(
            router.allowed_methods(),
            vec![Method::GET, Method::POST, Method::DELETE]
        );
        assert_eq!(router.allow_header(), "GET, POST, DELETE");

        let empty: MethodRouter<()> = MethodRouter::new();
        assert_eq!(empty.allow_header(), "");
    }
}
