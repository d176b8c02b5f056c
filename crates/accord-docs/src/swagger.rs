//! Swagger UI page and documentation mount points.
//!
//! The page loads Swagger UI from a CDN and points it at the URL where the
//! OpenAPI document is served, so the document is generated per request
//! and always reflects every registered route.

use serde::{Deserialize, Serialize};

/// Default URL of the OpenAPI document.
pub const DEFAULT_JSON_PATH: &str = "/docs/openapi.json";

/// Default URL of the Swagger UI page.
pub const DEFAULT_UI_PATH: &str = "/docs";

/// Where documentation is served and how it is titled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsMount {
    /// Path of the OpenAPI JSON document.
    pub json_path: String,
    /// Path of the Swagger UI page.
    pub ui_path: String,
    /// Document title; `"My API"` when unset.
    pub title: Option<String>,
    /// Document version; `"1.0.0"` when unset.
    pub version: Option<String>,
}

impl Default for DocsMount {
    fn default() -> Self {
        Self {
            json_path: DEFAULT_JSON_PATH.to_string(),
            ui_path: DEFAULT_UI_PATH.to_string(),
            title: None,
            version: None,
        }
    }
}

impl DocsMount {
    /// Default mount with a document title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Document expansion level for Swagger UI.
#[derive(Debug, Clone, Copy, Default)]
pub enum DocExpansion {
    /// Show all operations collapsed.
    None,
    /// Show only the list of operations.
    #[default]
    List,
    /// Expand all operations fully.
    Full,
}

impl DocExpansion {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Full => "full",
        }
    }
}

/// Swagger UI configuration and HTML generation.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    spec_url: String,
    title: String,
    deep_linking: bool,
    doc_expansion: DocExpansion,
    display_request_duration: bool,
    swagger_version: String,
}

impl SwaggerUi {
    /// Creates a page rendering the document served at `spec_url`.
    #[must_use]
    pub fn new(spec_url: impl Into<String>) -> Self {
        Self {
            spec_url: spec_url.into(),
            title: "API Docs - Swagger UI".to_string(),
            deep_linking: true,
            doc_expansion: DocExpansion::List,
            display_request_duration: true,
            swagger_version: "5.18.2".to_string(),
        }
    }

    /// Creates the page for a mount, titled after the document.
    #[must_use]
    pub fn for_mount(mount: &DocsMount) -> Self {
        let title = mount.title.as_deref().unwrap_or(crate::openapi::DEFAULT_TITLE);
        Self::new(mount.json_path.clone()).title(format!("{title} - Swagger UI"))
    }

    /// Set the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Enable or disable deep linking.
    #[must_use]
    pub fn deep_linking(mut self, enabled: bool) -> Self {
        self.deep_linking = enabled;
        self
    }

    /// Set the document expansion level.
    #[must_use]
    pub fn doc_expansion(mut self, expansion: DocExpansion) -> Self {
        self.doc_expansion = expansion;
        self
    }

    /// Enable or disable request duration display.
    #[must_use]
    pub fn display_request_duration(mut self, enabled: bool) -> Self {
        self.display_request_duration = enabled;
        self
    }

    /// Set the Swagger UI version loaded from the CDN.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = version.into();
        self
    }

    /// URL of the rendered document.
    #[must_use]
    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    /// The complete HTML page.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        html {{ box-sizing: border-box; overflow-y: scroll; }}
        *, *:before, *:after {{ box-sizing: inherit; }}
        body {{ margin: 0; background: #fafafa; }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                url: "{spec_url}",
                dom_id: '#swagger-ui',
                deepLinking: {deep_linking},
                docExpansion: '{doc_expansion}',
                displayRequestDuration: {display_duration},
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = html_escape(&self.swagger_version),
            spec_url = html_escape(&self.spec_url),
            deep_linking = self.deep_linking,
            doc_expansion = self.doc_expansion.as_str(),
            display_duration = self.display_request_duration,
        )
    }
}

/// Simple HTML escape for values interpolated into the page.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
