//! # Renderers
//!
//! Serializes a [`Document`] into the Core JSON layout consumed by
//! interactive documentation tools, or into pretty JSON / YAML views of the
//! same tree.

use crate::document::{Content, Document, Field, Link, Node};
use crate::error::{AppError, AppResult};
use serde_json::{Map, Value};

/// Media type of the Core JSON format.
pub const CORE_JSON_MEDIA_TYPE: &str = "application/coreapi+json";

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    /// Compact Core JSON.
    CoreJson,
    /// Indented Core JSON, for humans.
    Json,
    /// YAML rendering of the Core JSON tree.
    Yaml,
}

impl Renderer {
    /// The media type this renderer produces.
    pub fn media_type(&self) -> &'static str {
        match self {
            Renderer::CoreJson => CORE_JSON_MEDIA_TYPE,
            Renderer::Json => "application/json",
            Renderer::Yaml => "application/yaml",
        }
    }

    /// Renders a document to text.
    pub fn render(&self, document: &Document) -> AppResult<String> {
        let value = document_to_value(document);
        match self {
            Renderer::CoreJson => serde_json::to_string(&value)
                .map_err(|e| AppError::Render(format!("JSON serialization failed: {}", e))),
            Renderer::Json => serde_json::to_string_pretty(&value)
                .map_err(|e| AppError::Render(format!("JSON serialization failed: {}", e))),
            Renderer::Yaml => serde_yaml::to_string(&value)
                .map_err(|e| AppError::Render(format!("YAML serialization failed: {}", e))),
        }
    }

    /// Picks the first renderer from `available` whose media type is listed
    /// in the `Accept` header, falling back to the first available one.
    pub fn negotiate(accept: Option<&str>, available: &[Renderer]) -> Option<Renderer> {
        if let Some(accept) = accept {
            let wanted: Vec<&str> = accept
                .split(',')
                .filter_map(|part| part.split(';').next())
                .map(str::trim)
                .collect();
            for candidate in &wanted {
                if let Some(r) = available.iter().find(|r| r.media_type() == *candidate) {
                    return Some(*r);
                }
            }
        }
        available.first().copied()
    }
}

/// Builds the Core JSON value for a document.
pub fn document_to_value(document: &Document) -> Value {
    let mut map = Map::new();
    map.insert("_type".into(), Value::from("document"));

    let mut meta = Map::new();
    if let Some(url) = document.url.as_deref().filter(|u| !u.is_empty()) {
        meta.insert("url".into(), Value::from(url));
    }
    if let Some(title) = document.title.as_deref().filter(|t| !t.is_empty()) {
        meta.insert("title".into(), Value::from(title));
    }
    if !meta.is_empty() {
        map.insert("_meta".into(), Value::Object(meta));
    }

    extend_with_content(&mut map, &document.content);
    Value::Object(map)
}

fn extend_with_content(map: &mut Map<String, Value>, content: &Content) {
    for (key, node) in content {
        map.insert(key.clone(), node_to_value(node));
    }
}

fn node_to_value(node: &Node) -> Value {
    match node {
        Node::Link(link) => link_to_value(link),
        Node::Object(content) => {
            let mut map = Map::new();
            extend_with_content(&mut map, content);
            Value::Object(map)
        }
    }
}

fn link_to_value(link: &Link) -> Value {
    let mut map = Map::new();
    map.insert("_type".into(), Value::from("link"));
    map.insert("url".into(), Value::from(link.url.as_str()));
    map.insert("action".into(), Value::from(link.action.as_str()));
    if let Some(encoding) = &link.encoding {
        map.insert("encoding".into(), Value::from(encoding.as_str()));
    }
    if !link.fields.is_empty() {
        let fields = link.fields.iter().map(field_to_value).collect();
        map.insert("fields".into(), Value::Array(fields));
    }
    if !link.description.is_empty() {
        map.insert("description".into(), Value::from(link.description.as_str()));
    }
    Value::Object(map)
}

fn field_to_value(field: &Field) -> Value {
    let mut map = Map::new();
    map.insert("name".into(), Value::from(field.name.as_str()));
    if field.required {
        map.insert("required".into(), Value::Bool(true));
    }
    map.insert("location".into(), Value::from(field.location.as_str()));
    if !field.type_.is_empty() {
        map.insert("type".into(), Value::from(field.type_.as_str()));
    }
    if !field.description.is_empty() {
        map.insert("description".into(), Value::from(field.description.as_str()));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{insert_into, Location};
    use serde_json::json;

    fn sample() -> Document {
        let mut content = Content::new();
        insert_into(
            &mut content,
            &["users", "read"],
            Link {
                url: "/users/{pk}/".into(),
                action: "get".into(),
                encoding: None,
                fields: vec![Field::new("pk", Location::Path).required(true)],
                description: String::new(),
            },
        );
        Document::new(Some("Users API".into()), Some("/api/".into()), content)
    }

    #[test]
    fn test_corejson_layout() {
        let value = document_to_value(&sample());
        assert_eq!(
            value,
            json!({
                "_type": "document",
                "_meta": {"url": "/api/", "title": "Users API"},
                "users": {
                    "read": {
                        "_type": "link",
                        "url": "/users/{pk}/",
                        "action": "get",
                        "fields": [{"name": "pk", "required": true, "location": "path"}]
                    }
                }
            })
        );
    }

    #[test]
    fn test_yaml_render() {
        let out = Renderer::Yaml.render(&sample()).unwrap();
        assert!(out.contains("_type: document"));
        assert!(out.contains("location: path"));
    }

    #[test]
    fn test_negotiate() {
        let available = [Renderer::CoreJson, Renderer::Json];
        assert_eq!(
            Renderer::negotiate(Some("text/html, application/json;q=0.9"), &available),
            Some(Renderer::Json)
        );
        assert_eq!(
            Renderer::negotiate(Some("text/html"), &available),
            Some(Renderer::CoreJson)
        );
        assert_eq!(Renderer::negotiate(None, &[]), None);
    }
}
