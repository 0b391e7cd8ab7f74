//! # Field Extraction
//!
//! Collects link fields from the four sources a view offers: the URL
//! template, the serializer, the paginator and the filter backends.

use super::layout::is_list_view;
use super::SchemaGenerator;
use crate::document::{Field, Location};
use crate::pagination::as_query_fields;
use crate::serializers::{schema_type, Serializer};
use crate::urlconf::template_variables;
use crate::view::{HttpMethod, View};

/// Request media types interactive clients can encode.
const SUPPORTED_MEDIA_TYPES: [&str; 3] = [
    "application/json",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
];

impl SchemaGenerator {
    /// Media type for the request body: the first configured parser that
    /// clients can encode, `application/octet-stream` for a wildcard parser.
    pub fn get_encoding(&self, _path: &str, _method: HttpMethod, view: &View<'_>) -> Option<String> {
        for media_type in view.class.parser_media_types(&view.ctx) {
            if SUPPORTED_MEDIA_TYPES.contains(&media_type.as_str()) {
                return Some(media_type);
            }
            if media_type == "*/*" {
                return Some("application/octet-stream".into());
            }
        }
        None
    }

    /// One required `path` field per template variable.
    pub fn get_path_fields(&self, path: &str, _method: HttpMethod, _view: &View<'_>) -> Vec<Field> {
        template_variables(path)
            .into_iter()
            .map(|name| Field::new(name, Location::Path).required(true))
            .collect()
    }

    /// Request body fields for PUT, PATCH and POST, from the serializer.
    pub fn get_serializer_fields(
        &self,
        _path: &str,
        method: HttpMethod,
        view: &View<'_>,
    ) -> Vec<Field> {
        if !matches!(method, HttpMethod::Put | HttpMethod::Patch | HttpMethod::Post) {
            return Vec::new();
        }

        match view.class.serializer(&view.ctx) {
            None => Vec::new(),
            Some(Serializer::List { .. }) => vec![Field::new("data", Location::Body)
                .required(true)
                .with_type("array")],
            Some(Serializer::Composite { fields, .. }) => fields
                .iter()
                .filter(|f| !f.read_only && !f.is_hidden())
                .map(|f| {
                    Field::new(f.source.clone(), Location::Form)
                        .required(f.required && method != HttpMethod::Patch)
                        .with_description(f.help_text.clone().unwrap_or_default())
                        .with_type(schema_type(&f.kind))
                })
                .collect(),
        }
    }

    /// Paginator query fields, list endpoints only.
    pub fn get_pagination_fields(
        &self,
        path: &str,
        method: HttpMethod,
        view: &View<'_>,
    ) -> Vec<Field> {
        if !is_list_view(path, method, view) {
            return Vec::new();
        }
        match view.class.pagination(&view.ctx) {
            Some(paginator) => as_query_fields(paginator.get_fields(view)),
            None => Vec::new(),
        }
    }

    /// Filter backend query fields, list endpoints only.
    pub fn get_filter_fields(&self, path: &str, method: HttpMethod, view: &View<'_>) -> Vec<Field> {
        if !is_list_view(path, method, view) {
            return Vec::new();
        }
        view.class
            .filter_backends(&view.ctx)
            .iter()
            .flat_map(|backend| as_query_fields(backend.get_fields(view)))
            .collect()
    }
}
