//! Documentation registry.
//!
//! Routes registered with a contract are recorded here at startup and
//! compiled into an OpenAPI document on demand. Most applications use the
//! process-wide [`DocsRegistry::global`]; tests and embedded apps create
//! their own with [`DocsRegistry::new`].

use std::sync::{Arc, LazyLock};

use accord_contract::Contract;
use http::Method;
use parking_lot::RwLock;

use crate::error::DocsResult;
use crate::openapi::{OpenApi, OpenApiGenerator};

static GLOBAL: LazyLock<Arc<DocsRegistry>> = LazyLock::new(|| Arc::new(DocsRegistry::new()));

/// One documented route.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Path template, e.g. `/users/{id}`.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// The route's contract.
    pub contract: Arc<Contract>,
    /// Tags grouping the operation.
    pub tags: Vec<String>,
}

/// Accumulates route definitions for document generation.
#[derive(Debug, Default)]
pub struct DocsRegistry {
    definitions: RwLock<Vec<RouteDefinition>>,
}

impl DocsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Records a route.
    ///
    /// Returns `false` when the method and path were already recorded; the
    /// first definition is kept.
    pub fn register_path(
        &self,
        path: impl Into<String>,
        method: Method,
        contract: Arc<Contract>,
        tags: Vec<String>,
    ) -> bool {
        let path = path.into();
        let mut definitions = self.definitions.write();
        if definitions
            .iter()
            .any(|d| d.path == path && d.method == method)
        {
            tracing::debug!(%method, %path, "route already documented");
            return false;
        }
        tracing::debug!(%method, %path, ?tags, "documenting route");
        definitions.push(RouteDefinition {
            path,
            method,
            contract,
            tags,
        });
        true
    }

    /// A snapshot of the recorded routes, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.definitions.read().clone()
    }

    /// Number of recorded routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    /// Forgets every recorded route.
    pub fn reset(&self) {
        self.definitions.write().clear();
    }

    /// Compiles the recorded routes with default document settings.
    ///
    /// `title` defaults to `"My API"`.
    pub fn generate_document(&self, title: Option<&str>) -> DocsResult<OpenApi> {
        let mut generator = OpenApiGenerator::new();
        if let Some(title) = title {
            generator = generator.title(title);
        }
        self.generate_with(&generator)
    }

    /// Compiles the recorded routes with `generator`.
    pub fn generate_with(&self, generator: &OpenApiGenerator) -> DocsResult<OpenApi> {
        generator.generate(&self.definitions.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_contract::Schema;

    fn contract() -> Arc<Contract> {
        Arc::new(
            Contract::builder()
                .response(Schema::object([("ok", Schema::boolean())]))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_register_and_reset() {
        let registry = DocsRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.register_path("/users", Method::GET, contract(), vec!["Users".into()]));
        assert!(registry.register_path("/users", Method::POST, contract(), vec![]));
        assert_eq!(registry.len(), 2);

        let methods: Vec<Method> = registry.definitions().into_iter().map(|d| d.method).collect();
        assert_eq!(methods, vec![Method::GET, Method::POST]);

        registry.reset();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_route_keeps_first() {
        let registry = DocsRegistry::new();
        assert!(registry.register_path("/users", Method::GET, contract(), vec!["First".into()]));
        assert!(!registry.register_path("/users", Method::GET, contract(), vec!["Second".into()]));

        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].tags, vec!["First"]);
    }

    #[test]
    fn test_generate_document_title() {
        let registry = DocsRegistry::new();
        registry.register_path("/health", Method::GET, contract(), vec![]);

        let doc = registry.generate_document(None).unwrap();
        assert_eq!(doc.info.title, "My API");
        assert!(doc.operation("/health", &Method::GET).is_some());

        let doc = registry.generate_document(Some("Health API")).unwrap();
        assert_eq!(doc.info.title, "Health API");
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&DocsRegistry::global(), &DocsRegistry::global()));
    }
}
