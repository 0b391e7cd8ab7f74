//! # Declared Views
//!
//! View declarations read from a project file, and the [`DeclaredView`]
//! that implements the view hooks from them.

use super::Settings;
use crate::error::{AppError, AppResult};
use crate::filters::{DjangoFilterBackend, FilterBackend, OrderingFilter, SearchFilter};
use crate::pagination::{CursorPagination, LimitOffsetPagination, PageNumberPagination, Paginator};
use crate::serializers::{FieldKind, Serializer, SerializerField};
use crate::view::{
    AllowAny, ApiView, HttpMethod, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly,
    Permission, ViewContext, ViewHandler,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Pagination style of a view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum PaginationDecl {
    /// No pagination.
    None,
    /// `?page=N`.
    PageNumber {
        /// Page parameter name.
        #[serde(default = "default_page_param")]
        page_query_param: String,
        /// Optional page size parameter name.
        #[serde(default)]
        page_size_query_param: Option<String>,
    },
    /// `?limit=N&offset=M`.
    LimitOffset {
        /// Limit parameter name.
        #[serde(default = "default_limit_param")]
        limit_query_param: String,
        /// Offset parameter name.
        #[serde(default = "default_offset_param")]
        offset_query_param: String,
    },
    /// `?cursor=...`.
    Cursor {
        /// Cursor parameter name.
        #[serde(default = "default_cursor_param")]
        cursor_query_param: String,
    },
}

fn default_page_param() -> String {
    "page".into()
}

fn default_limit_param() -> String {
    "limit".into()
}

fn default_offset_param() -> String {
    "offset".into()
}

fn default_cursor_param() -> String {
    "cursor".into()
}

impl PaginationDecl {
    fn build(&self) -> Option<Arc<dyn Paginator>> {
        match self {
            PaginationDecl::None => None,
            PaginationDecl::PageNumber {
                page_query_param,
                page_size_query_param,
            } => Some(Arc::new(PageNumberPagination {
                page_query_param: page_query_param.clone(),
                page_size_query_param: page_size_query_param.clone(),
            })),
            PaginationDecl::LimitOffset {
                limit_query_param,
                offset_query_param,
            } => Some(Arc::new(LimitOffsetPagination {
                limit_query_param: limit_query_param.clone(),
                offset_query_param: offset_query_param.clone(),
            })),
            PaginationDecl::Cursor { cursor_query_param } => Some(Arc::new(CursorPagination {
                cursor_query_param: cursor_query_param.clone(),
            })),
        }
    }
}

/// Built-in filter backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDecl {
    /// Exact match on `filter_fields`.
    Django,
    /// `?search=`.
    Search,
    /// `?ordering=`.
    Ordering,
}

impl FilterDecl {
    fn build(self) -> Arc<dyn FilterBackend> {
        match self {
            FilterDecl::Django => Arc::new(DjangoFilterBackend),
            FilterDecl::Search => Arc::new(SearchFilter::default()),
            FilterDecl::Ordering => Arc::new(OrderingFilter::default()),
        }
    }
}

/// Built-in permission classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDecl {
    /// Everyone.
    AllowAny,
    /// Authenticated users.
    IsAuthenticated,
    /// Staff users.
    IsAdminUser,
    /// Authenticated users, or anyone for safe methods.
    IsAuthenticatedOrReadOnly,
}

impl PermissionDecl {
    fn build(self) -> Arc<dyn Permission> {
        match self {
            PermissionDecl::AllowAny => Arc::new(AllowAny),
            PermissionDecl::IsAuthenticated => Arc::new(IsAuthenticated),
            PermissionDecl::IsAdminUser => Arc::new(IsAdminUser),
            PermissionDecl::IsAuthenticatedOrReadOnly => Arc::new(IsAuthenticatedOrReadOnly),
        }
    }
}

/// Field kind names accepted in project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum FieldKindDecl {
    Char,
    Email,
    Slug,
    Url,
    Uuid,
    Integer,
    Float,
    Decimal,
    Boolean,
    NullBoolean,
    Date,
    DateTime,
    Time,
    Duration,
    Choice,
    MultipleChoice,
    File,
    Image,
    PrimaryKeyRelated,
    ManyRelated,
    Hidden,
    ReadOnly,
    SerializerMethod,
    List,
    Dict,
    Json,
    Nested,
}

/// One declared serializer field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Field kind.
    #[serde(rename = "type")]
    pub kind: FieldKindDecl,
    /// Output-only flag.
    #[serde(default)]
    pub read_only: bool,
    /// Overrides the default requiredness.
    #[serde(default)]
    pub required: Option<bool>,
    /// Help text.
    #[serde(default)]
    pub help_text: Option<String>,
    /// Source attribute, defaults to the name.
    #[serde(default)]
    pub source: Option<String>,
    /// Child serializer of a `nested` field.
    #[serde(default)]
    pub serializer: Option<SerializerDecl>,
}

/// A declared serializer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializerDecl {
    /// Serializer name.
    pub name: String,
    /// Wrap as a list serializer.
    #[serde(default)]
    pub many: bool,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl SerializerDecl {
    /// Converts the declaration into a serializer.
    pub fn build(&self) -> AppResult<Serializer> {
        let fields = self
            .fields
            .iter()
            .map(FieldDecl::build)
            .collect::<AppResult<Vec<_>>>()?;
        let serializer = Serializer::composite(self.name.clone(), fields);
        Ok(if self.many {
            serializer.many()
        } else {
            serializer
        })
    }
}

impl FieldDecl {
    fn build(&self) -> AppResult<SerializerField> {
        let kind = match self.kind {
            FieldKindDecl::Nested => {
                let child = self.serializer.as_ref().ok_or_else(|| {
                    AppError::Config(format!(
                        "Nested field '{}' has no 'serializer' declaration",
                        self.name
                    ))
                })?;
                FieldKind::Nested(Box::new(child.build()?))
            }
            FieldKindDecl::Char => FieldKind::Char,
            FieldKindDecl::Email => FieldKind::Email,
            FieldKindDecl::Slug => FieldKind::Slug,
            FieldKindDecl::Url => FieldKind::Url,
            FieldKindDecl::Uuid => FieldKind::Uuid,
            FieldKindDecl::Integer => FieldKind::Integer,
            FieldKindDecl::Float => FieldKind::Float,
            FieldKindDecl::Decimal => FieldKind::Decimal,
            FieldKindDecl::Boolean => FieldKind::Boolean,
            FieldKindDecl::NullBoolean => FieldKind::NullBoolean,
            FieldKindDecl::Date => FieldKind::Date,
            FieldKindDecl::DateTime => FieldKind::DateTime,
            FieldKindDecl::Time => FieldKind::Time,
            FieldKindDecl::Duration => FieldKind::Duration,
            FieldKindDecl::Choice => FieldKind::Choice,
            FieldKindDecl::MultipleChoice => FieldKind::MultipleChoice,
            FieldKindDecl::File => FieldKind::File,
            FieldKindDecl::Image => FieldKind::Image,
            FieldKindDecl::PrimaryKeyRelated => FieldKind::PrimaryKeyRelated,
            FieldKindDecl::ManyRelated => FieldKind::ManyRelated,
            FieldKindDecl::Hidden => FieldKind::Hidden,
            FieldKindDecl::ReadOnly => FieldKind::ReadOnly,
            FieldKindDecl::SerializerMethod => FieldKind::SerializerMethod,
            FieldKindDecl::List => FieldKind::List,
            FieldKindDecl::Dict => FieldKind::Dict,
            FieldKindDecl::Json => FieldKind::Json,
        };

        let mut field = SerializerField::new(self.name.clone(), kind);
        if self.read_only {
            field = field.read_only();
        }
        if let Some(required) = self.required {
            field = field.required(required);
        }
        if let Some(text) = &self.help_text {
            field = field.help_text(text.clone());
        }
        if let Some(source) = &self.source {
            field = field.source(source.clone());
        }
        Ok(field)
    }
}

/// A view declaration. Unset options fall back to the project settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ViewDecl {
    /// Overall description, sections headed by `action:` lines.
    #[serde(default)]
    pub description: String,
    /// Methods a plain view handles.
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// Request body serializer.
    #[serde(default)]
    pub serializer: Option<SerializerDecl>,
    /// Per-action serializer overrides.
    #[serde(default)]
    pub action_serializers: IndexMap<String, SerializerDecl>,
    /// Pagination style.
    #[serde(default)]
    pub pagination: Option<PaginationDecl>,
    /// Filter backends.
    #[serde(default)]
    pub filter_backends: Option<Vec<FilterDecl>>,
    /// Fields for exact-match filtering.
    #[serde(default)]
    pub filter_fields: Vec<String>,
    /// Fields for search filtering.
    #[serde(default)]
    pub search_fields: Vec<String>,
    /// Parser media types.
    #[serde(default)]
    pub parser_classes: Option<Vec<String>>,
    /// Permission classes.
    #[serde(default)]
    pub permission_classes: Option<Vec<PermissionDecl>>,
    /// Hide the view from schemas.
    #[serde(default)]
    pub exclude_from_schema: bool,
    /// Handler docs keyed by action or lowercase method.
    #[serde(default)]
    pub docs: IndexMap<String, String>,
}

/// A view built from a [`ViewDecl`] and the project settings.
pub struct DeclaredView {
    name: String,
    description: String,
    allowed_methods: Vec<HttpMethod>,
    serializer: Option<Serializer>,
    action_serializers: IndexMap<String, Serializer>,
    pagination: Option<Arc<dyn Paginator>>,
    filter_backends: Vec<Arc<dyn FilterBackend>>,
    filter_fields: Vec<String>,
    search_fields: Vec<String>,
    parsers: Vec<String>,
    permissions: Vec<Arc<dyn Permission>>,
    exclude_from_schema: bool,
    docs: IndexMap<String, String>,
}

impl DeclaredView {
    /// Resolves a declaration against the project settings.
    pub fn build(name: &str, decl: &ViewDecl, settings: &Settings) -> AppResult<Self> {
        let mut allowed_methods = decl
            .allowed_methods
            .iter()
            .map(|m| {
                m.parse::<HttpMethod>()
                    .map_err(|e| AppError::Config(format!("View '{}': {}", name, e)))
            })
            .collect::<AppResult<Vec<_>>>()?;
        if !allowed_methods.contains(&HttpMethod::Options) {
            allowed_methods.push(HttpMethod::Options);
        }

        let action_serializers = decl
            .action_serializers
            .iter()
            .map(|(action, s)| s.build().map(|built| (action.clone(), built)))
            .collect::<AppResult<IndexMap<_, _>>>()?;

        let pagination = decl
            .pagination
            .as_ref()
            .or(settings.default_pagination.as_ref())
            .and_then(PaginationDecl::build);

        let filter_backends = decl
            .filter_backends
            .as_ref()
            .unwrap_or(&settings.default_filter_backends)
            .iter()
            .map(|f| f.build())
            .collect();

        let permissions = decl
            .permission_classes
            .as_ref()
            .unwrap_or(&settings.default_permission_classes)
            .iter()
            .map(|p| p.build())
            .collect();

        Ok(Self {
            name: name.to_string(),
            description: decl.description.clone(),
            allowed_methods,
            serializer: decl.serializer.as_ref().map(SerializerDecl::build).transpose()?,
            action_serializers,
            pagination,
            filter_backends,
            filter_fields: decl.filter_fields.clone(),
            search_fields: decl.search_fields.clone(),
            parsers: decl
                .parser_classes
                .clone()
                .unwrap_or_else(|| settings.default_parser_classes.clone()),
            permissions,
            exclude_from_schema: decl.exclude_from_schema,
            docs: decl.docs.clone(),
        })
    }
}

impl fmt::Debug for DeclaredView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredView")
            .field("name", &self.name)
            .field("allowed_methods", &self.allowed_methods)
            .field("exclude_from_schema", &self.exclude_from_schema)
            .finish_non_exhaustive()
    }
}

impl ViewHandler for DeclaredView {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_api_view(&self) -> Option<&dyn ApiView> {
        Some(self)
    }
}

impl ApiView for DeclaredView {
    fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.allowed_methods.clone()
    }

    fn exclude_from_schema(&self, ctx: &ViewContext) -> bool {
        ctx.initkwarg("exclude_from_schema")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(self.exclude_from_schema)
    }

    fn serializer(&self, ctx: &ViewContext) -> Option<Serializer> {
        ctx.action()
            .and_then(|action| self.action_serializers.get(action))
            .or(self.serializer.as_ref())
            .cloned()
    }

    fn view_description(&self, ctx: &ViewContext) -> String {
        ctx.initkwarg("description")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.description.clone())
    }

    fn action_doc(&self, name: &str) -> Option<String> {
        self.docs.get(name).cloned()
    }

    fn pagination(&self, _ctx: &ViewContext) -> Option<Arc<dyn Paginator>> {
        self.pagination.clone()
    }

    fn filter_backends(&self, _ctx: &ViewContext) -> Vec<Arc<dyn FilterBackend>> {
        self.filter_backends.clone()
    }

    fn parser_media_types(&self, _ctx: &ViewContext) -> Vec<String> {
        self.parsers.clone()
    }

    fn permissions(&self, _ctx: &ViewContext) -> Vec<Arc<dyn Permission>> {
        self.permissions.clone()
    }

    fn filter_fields(&self) -> Vec<String> {
        self.filter_fields.clone()
    }

    fn search_fields(&self) -> Vec<String> {
        self.search_fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(yaml: &str) -> ViewDecl {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_settings_fallbacks() {
        let settings = Settings {
            default_pagination: Some(PaginationDecl::Cursor {
                cursor_query_param: "c".into(),
            }),
            default_filter_backends: vec![FilterDecl::Search],
            ..Settings::default()
        };
        let view = DeclaredView::build("Notes", &decl("allowed_methods: [get]"), &settings).unwrap();
        assert!(view.pagination.is_some());
        assert_eq!(view.filter_backends.len(), 1);
        assert_eq!(view.parsers, settings.default_parser_classes);
        assert_eq!(view.allowed_methods, vec![HttpMethod::Get, HttpMethod::Options]);
    }

    #[test]
    fn test_explicit_none_pagination_overrides_default() {
        let settings = Settings {
            default_pagination: Some(PaginationDecl::PageNumber {
                page_query_param: "page".into(),
                page_size_query_param: None,
            }),
            ..Settings::default()
        };
        let view = DeclaredView::build("Notes", &decl("pagination: {style: none}"), &settings).unwrap();
        assert!(view.pagination.is_none());
    }

    #[test]
    fn test_nested_field_requires_serializer() {
        let d = decl(
            r#"
serializer:
  name: Note
  fields:
    - {name: author, type: nested}
"#,
        );
        let err = DeclaredView::build("Notes", &d, &Settings::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_bad_method_is_config_error() {
        let err = DeclaredView::build("Notes", &decl("allowed_methods: [fetch]"), &Settings::default())
            .unwrap_err();
        assert!(err.to_string().contains("Notes"));
    }

    #[test]
    fn test_action_serializer_and_initkwargs() {
        let d = decl(
            r#"
description: Base text
serializer: {name: Note, fields: [{name: body, type: char}]}
action_serializers:
  star: {name: Star, fields: [{name: weight, type: integer}]}
"#,
        );
        let view = DeclaredView::build("Notes", &d, &Settings::default()).unwrap();

        let star = ViewContext::builder().action(Some("star".into())).build();
        match view.serializer(&star) {
            Some(Serializer::Composite { name, .. }) => assert_eq!(name, "Star"),
            other => panic!("unexpected serializer {:?}", other),
        }

        let mut kwargs = IndexMap::new();
        kwargs.insert("description".to_string(), serde_json::json!("Overridden"));
        kwargs.insert("exclude_from_schema".to_string(), serde_json::json!(true));
        let ctx = ViewContext::builder().initkwargs(kwargs).build();
        assert_eq!(view.view_description(&ctx), "Overridden");
        assert!(view.exclude_from_schema(&ctx));
        match view.serializer(&ctx) {
            Some(Serializer::Composite { name, .. }) => assert_eq!(name, "Note"),
            other => panic!("unexpected serializer {:?}", other),
        }
    }
}
