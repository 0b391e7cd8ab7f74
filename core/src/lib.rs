#![deny(missing_docs)]

//! # apischema core
//!
//! Generates hypermedia schema documents for REST views and viewsets by
//! walking a URL routing tree.
//!
//! The pipeline: [`EndpointInspector`] lists `(path, method, callback)`
//! endpoints, [`SchemaGenerator`] materializes a throwaway view per endpoint,
//! filters it by exclusion and permissions, and lays the resulting links out
//! in a [`Document`].

/// Shared error types.
pub mod error;

/// Document / Link / Field primitives.
pub mod document;

/// Core JSON, JSON and YAML renderers.
pub mod render;

/// Routing tree and URL template helpers.
pub mod urlconf;

/// View, request and permission interfaces.
pub mod view;

/// Serializer field introspection.
pub mod serializers;

/// Paginator query fields.
pub mod pagination;

/// Filter backend query fields.
pub mod filters;

/// Endpoint discovery.
pub mod inspector;

/// Schema generation.
pub mod generator;

/// The schema-serving endpoint.
pub mod schema_view;

/// Declarative project configuration.
pub mod config;

pub use config::{ProjectConfig, Settings};
pub use document::{insert_into, Content, Document, Field, Link, Location, Node};
pub use error::{ApiException, AppError, AppResult};
pub use generator::SchemaGenerator;
pub use inspector::{Endpoint, EndpointInspector};
pub use render::Renderer;
pub use schema_view::{SchemaResponse, SchemaView};
pub use urlconf::{Callback, UrlNode};
pub use view::{ApiView, HttpMethod, Request, User, ViewHandler};
