//! # Schema View
//!
//! The endpoint that serves the generated schema. Callers with no visible
//! API surface get a permission error rather than an empty document.

use crate::error::{AppError, AppResult};
use crate::generator::SchemaGenerator;
use crate::render::Renderer;
use crate::view::Request;

/// A rendered schema response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content type of `body`.
    pub media_type: &'static str,
    /// Rendered document.
    pub body: String,
}

/// Serves the schema of one generator.
#[derive(Debug)]
pub struct SchemaView {
    generator: SchemaGenerator,
    renderers: Vec<Renderer>,
}

impl SchemaView {
    /// Creates a view. An empty renderer list falls back to Core JSON.
    pub fn new(generator: SchemaGenerator, renderers: Vec<Renderer>) -> Self {
        let renderers = if renderers.is_empty() {
            vec![Renderer::CoreJson]
        } else {
            renderers
        };
        Self {
            generator,
            renderers,
        }
    }

    /// Default renderers: Core JSON, plus a human readable JSON view when the
    /// browsable API is enabled.
    pub fn default_renderers(browsable: bool) -> Vec<Renderer> {
        if browsable {
            vec![Renderer::CoreJson, Renderer::Json]
        } else {
            vec![Renderer::CoreJson]
        }
    }

    /// The wrapped generator.
    pub fn generator(&self) -> &SchemaGenerator {
        &self.generator
    }

    /// Handles a GET request.
    pub fn get(&self, request: &Request) -> AppResult<SchemaResponse> {
        let schema = self.generator.get_schema(Some(request)).ok_or_else(|| {
            AppError::PermissionDenied(
                "You do not have permission to perform this action.".into(),
            )
        })?;

        let renderer = Renderer::negotiate(request.accept.as_deref(), &self.renderers)
            .unwrap_or(Renderer::CoreJson);

        Ok(SchemaResponse {
            status: 200,
            media_type: renderer.media_type(),
            body: renderer.render(&schema)?,
        })
    }
}
