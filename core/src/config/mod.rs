//! # Project Configuration
//!
//! Loads a declarative project file (YAML or JSON) describing views and the
//! URL configuration, and builds the routing tree from it.
//!
//! ```yaml
//! title: Example API
//! url: https://api.example.org/
//! settings:
//!   default_pagination: {style: page_number}
//! views:
//!   UserViewSet:
//!     description: Users of the service.
//! urlpatterns:
//!   - regex: ^users/$
//!     view: UserViewSet
//!     actions: {get: list, post: create}
//!   - regex: ^admin/
//!     plain: admin_site
//! ```

pub mod declared;

use crate::error::{AppError, AppResult};
use crate::generator::SchemaGenerator;
use crate::schema_view::SchemaView;
use crate::urlconf::{Callback, PlainView, UrlNode, UrlPattern, UrlResolver};
use crate::view::{ActionMap, HttpMethod, ViewHandler};
use declared::{DeclaredView, FilterDecl, PaginationDecl, PermissionDecl, ViewDecl};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Environment variable naming the default project file.
pub const URLCONF_ENV: &str = "APISCHEMA_URLCONF";

/// Framework-wide defaults applied to every declared view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Pagination for views that declare none.
    pub default_pagination: Option<PaginationDecl>,
    /// Filter backends for views that declare none.
    pub default_filter_backends: Vec<FilterDecl>,
    /// Parser media types for views that declare none.
    pub default_parser_classes: Vec<String>,
    /// Permission classes for views that declare none.
    pub default_permission_classes: Vec<PermissionDecl>,
    /// Offer a human readable JSON rendering next to Core JSON.
    pub browsable_api: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_pagination: None,
            default_filter_backends: Vec::new(),
            default_parser_classes: vec![
                "application/json".into(),
                "application/x-www-form-urlencoded".into(),
                "multipart/form-data".into(),
            ],
            default_permission_classes: vec![PermissionDecl::AllowAny],
            browsable_api: false,
        }
    }
}

/// One entry of `urlpatterns`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteDecl {
    /// A nested set of routes under a prefix.
    Include {
        /// Prefix regex.
        regex: String,
        /// Nested routes.
        include: Vec<RouteDecl>,
    },
    /// A route to a declared view.
    View {
        /// Route regex.
        regex: String,
        /// Name of the declared view.
        view: String,
        /// Viewset action map (`method: action`).
        #[serde(default)]
        actions: Option<IndexMap<String, String>>,
        /// Attribute overrides.
        #[serde(default)]
        initkwargs: IndexMap<String, serde_json::Value>,
        /// Optional route name.
        #[serde(default)]
        name: Option<String>,
    },
    /// A route to a handler outside the REST view layer.
    Plain {
        /// Route regex.
        regex: String,
        /// Handler name.
        plain: String,
    },
}

/// A whole project file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Schema title.
    #[serde(default)]
    pub title: Option<String>,
    /// Base URL of the API.
    #[serde(default)]
    pub url: Option<String>,
    /// Framework-wide defaults.
    #[serde(default)]
    pub settings: Settings,
    /// Declared views by name.
    #[serde(default)]
    pub views: IndexMap<String, ViewDecl>,
    /// The URL configuration.
    #[serde(default)]
    pub urlpatterns: Vec<RouteDecl>,
}

impl ProjectConfig {
    /// Parses a YAML project.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse project YAML: {}", e)))
    }

    /// Parses a JSON project.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse project JSON: {}", e)))
    }

    /// Reads a project file; `.json` files are JSON, anything else YAML.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Builds the routing tree.
    pub fn build_patterns(&self) -> AppResult<Vec<UrlNode>> {
        let mut handlers: HashMap<String, Arc<dyn ViewHandler>> = HashMap::new();
        for (name, decl) in &self.views {
            let view = DeclaredView::build(name, decl, &self.settings)?;
            handlers.insert(name.clone(), Arc::new(view));
        }
        build_routes(&self.urlpatterns, &handlers)
    }

    /// A generator over this project, with optional title / url overrides.
    pub fn generator(&self, title: Option<String>, url: Option<String>) -> AppResult<SchemaGenerator> {
        Ok(SchemaGenerator::new(
            title.or_else(|| self.title.clone()),
            url.or_else(|| self.url.clone()),
            self.build_patterns()?,
        ))
    }

    /// A schema view over this project.
    pub fn schema_view(&self) -> AppResult<SchemaView> {
        Ok(SchemaView::new(
            self.generator(None, None)?,
            SchemaView::default_renderers(self.settings.browsable_api),
        ))
    }
}

fn check_regex(regex: &str) -> AppResult<()> {
    Regex::new(regex)
        .map(|_| ())
        .map_err(|e| AppError::Config(format!("Invalid URL pattern '{}': {}", regex, e)))
}

fn build_action_map(view: &str, actions: &IndexMap<String, String>) -> AppResult<ActionMap> {
    actions
        .iter()
        .map(|(method, action)| -> AppResult<(String, String)> {
            let method = method
                .parse::<HttpMethod>()
                .map_err(|e| AppError::Config(format!("Route to '{}': {}", view, e)))?;
            Ok((method.lowercase(), action.clone()))
        })
        .collect()
}

fn build_routes(
    routes: &[RouteDecl],
    handlers: &HashMap<String, Arc<dyn ViewHandler>>,
) -> AppResult<Vec<UrlNode>> {
    let mut nodes = Vec::with_capacity(routes.len());
    for route in routes {
        let node = match route {
            RouteDecl::Include { regex, include } => {
                check_regex(regex)?;
                UrlNode::Resolver(UrlResolver {
                    regex: regex.clone(),
                    patterns: build_routes(include, handlers)?,
                })
            }
            RouteDecl::View {
                regex,
                view,
                actions,
                initkwargs,
                name,
            } => {
                check_regex(regex)?;
                let handler = handlers
                    .get(view)
                    .cloned()
                    .ok_or_else(|| AppError::Config(format!("Unknown view '{}'", view)))?;
                let mut callback = match actions {
                    Some(actions) => {
                        Callback::with_actions(handler, build_action_map(view, actions)?)
                    }
                    None => Callback::new(handler),
                };
                callback.initkwargs = initkwargs.clone();
                UrlNode::Pattern(UrlPattern {
                    regex: regex.clone(),
                    callback,
                    name: name.clone(),
                })
            }
            RouteDecl::Plain { regex, plain } => {
                check_regex(regex)?;
                debug!(%regex, handler = %plain, "plain route");
                UrlNode::pattern(regex.clone(), Callback::new(Arc::new(PlainView::new(plain))))
            }
        };
        nodes.push(node);
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
title: Notes
views:
  NoteViewSet:
    description: Notes.
urlpatterns:
  - regex: ^api/
    include:
      - regex: ^notes/$
        view: NoteViewSet
        actions: {GET: list, post: create}
  - regex: ^admin/$
    plain: admin
"#;

    #[test]
    fn test_build_patterns() {
        let config = ProjectConfig::from_yaml_str(PROJECT).unwrap();
        let patterns = config.build_patterns().unwrap();
        assert_eq!(patterns.len(), 2);
        let UrlNode::Resolver(api) = &patterns[0] else {
            panic!("expected resolver");
        };
        let UrlNode::Pattern(notes) = &api.patterns[0] else {
            panic!("expected pattern");
        };
        let actions = notes.callback.actions.as_ref().unwrap();
        assert_eq!(actions.get("get").map(String::as_str), Some("list"));
        assert!(notes.callback.is_api_view());

        let UrlNode::Pattern(admin) = &patterns[1] else {
            panic!("expected pattern");
        };
        assert!(!admin.callback.is_api_view());
    }

    #[test]
    fn test_unknown_view_is_config_error() {
        let config = ProjectConfig::from_yaml_str(
            "urlpatterns:\n  - {regex: ^x/$, view: Missing}\n",
        )
        .unwrap();
        let err = config.build_patterns().unwrap_err();
        assert_eq!(err.to_string(), "Configuration Error: Unknown view 'Missing'");
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let config =
            ProjectConfig::from_yaml_str("urlpatterns:\n  - {regex: '^x/(', plain: x}\n").unwrap();
        assert!(matches!(config.build_patterns(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_parser_classes.len(), 3);
        assert_eq!(settings.default_permission_classes, vec![PermissionDecl::AllowAny]);
        let config = ProjectConfig::from_json_str(r#"{"settings": {"browsable_api": true}}"#).unwrap();
        assert!(config.settings.browsable_api);
        assert_eq!(config.settings.default_parser_classes.len(), 3);
    }

    #[test]
    fn test_generator_overrides() {
        let config = ProjectConfig::from_yaml_str(PROJECT).unwrap();
        let generator = config.generator(None, Some("/v2".into())).unwrap();
        assert_eq!(generator.title(), Some("Notes"));
        assert_eq!(generator.url(), Some("/v2/"));
    }
}
