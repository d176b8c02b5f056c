//! High-level router API.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::{parse_template, Node};
use crate::params::Params;

/// Outcome of [`Router::at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<'a, T> {
    /// A route matched the path and method.
    Found {
        /// The registered value.
        value: &'a T,
        /// Captured path parameters.
        params: Params,
    },
    /// A route matched the path but not the method.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// No route matched the path.
    NotFound,
}

impl<'a, T> Match<'a, T> {
    /// The matched value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&'a T> {
        match self {
            Self::Found { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// A path router over values of type `T`.
///
/// Templates are `/`-separated; `{name}` captures one segment and `*name`
/// captures the rest of the path.
///
/// # Route Priority
///
/// 1. **Literal segments** (e.g., `/users/me`)
/// 2. **Parameter segments** (e.g., `/users/{id}`)
/// 3. **Wildcard segments** (e.g., `/files/*path`)
///
/// # Example
///
/// ```rust
/// use accord_router::{Match, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(&Method::GET, "/users/{id}", "getUser");
///
/// match router.at(&Method::GET, "/users/123") {
///     Match::Found { value, params } => {
///         assert_eq!(*value, "getUser");
///         assert_eq!(params.get("id"), Some("123"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
///
/// assert!(matches!(
///     router.at(&Method::POST, "/users/123"),
///     Match::MethodNotAllowed { .. }
/// ));
/// assert_eq!(router.at(&Method::GET, "/posts"), Match::NotFound);
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` for `method` on `template`.
    ///
    /// Returns `false` if the method was already registered for the
    /// template; the first registration is kept.
    pub fn insert(&mut self, method: &Method, template: &str, value: T) -> bool {
        let mut methods = MethodRouter::new();
        if !methods.insert(method, value) {
            return false;
        }
        self.insert_methods(template, methods) == 0
    }

    /// Registers several methods on `template` at once.
    ///
    /// Returns the number of values dropped as duplicates.
    pub fn insert_methods(&mut self, template: &str, methods: MethodRouter<T>) -> usize {
        let added = methods.allowed_methods().len();
        let dropped = self.root.insert(&parse_template(template), methods);
        self.route_count += added - dropped;
        dropped
    }

    /// Resolves `method` and `path`.
    #[must_use]
    pub fn at(&self, method: &Method, path: &str) -> Match<'_, T> {
        let Some((methods, params)) = self.match_path(path) else {
            return Match::NotFound;
        };
        match methods.at(method) {
            Some(value) => Match::Found { value, params },
            None => Match::MethodNotAllowed {
                allowed: methods.allowed_methods(),
            },
        }
    }

    /// Resolves `path` regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.root.find(&segments, &mut params)?;
        Some((methods, params))
    }

    /// Number of registered method/template pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
