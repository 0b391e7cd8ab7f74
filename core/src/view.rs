//! # View Layer
//!
//! The host-facing seam of the crate. A routing callback points at a
//! [`ViewHandler`]; handlers that belong to the REST view abstraction expose
//! it through [`ViewHandler::as_api_view`], and the generator only talks to
//! them through the [`ApiView`] hooks.

use crate::error::ApiException;
use crate::filters::FilterBackend;
use crate::pagination::Paginator;
use crate::serializers::Serializer;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Ordered mapping of lowercase HTTP method to viewset action name.
pub type ActionMap = IndexMap<String, String>;

/// HTTP request methods understood by the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase method name, as used in action maps and link actions.
    pub fn lowercase(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Sort priority used to order endpoints sharing a path.
    pub fn priority(&self) -> u8 {
        match self {
            HttpMethod::Get => 0,
            HttpMethod::Post => 1,
            HttpMethod::Put => 2,
            HttpMethod::Patch => 3,
            HttpMethod::Delete => 4,
            _ => 5,
        }
    }

    /// Methods that never modify state.
    pub fn is_safe(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head | HttpMethod::Options)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(format!("Unsupported HTTP method: {}", other)),
        }
    }
}

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Staff users pass admin-only permission checks.
    pub is_staff: bool,
}

/// The parts of an inbound request that permission hooks inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method.
    pub method: HttpMethod,
    /// Authenticated user, `None` for anonymous requests.
    pub user: Option<User>,
    /// Raw `Accept` header.
    pub accept: Option<String>,
}

impl Request {
    /// An anonymous request.
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            user: None,
            accept: None,
        }
    }

    /// Attaches an authenticated user.
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets the `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Copy of this request with a different method.
    pub fn clone_with_method(&self, method: HttpMethod) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }

    /// True when a user is attached.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Request-scoped state of a materialized view.
///
/// Built once per endpoint by [`ViewContextBuilder`] and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewContext {
    action: Option<String>,
    action_map: Option<ActionMap>,
    request: Option<Request>,
    initkwargs: IndexMap<String, serde_json::Value>,
    args: Vec<String>,
    kwargs: IndexMap<String, String>,
    format_kwarg: Option<String>,
}

impl ViewContext {
    /// Starts a builder.
    pub fn builder() -> ViewContextBuilder {
        ViewContextBuilder::default()
    }

    /// Resolved action name; `Some` only for viewset callbacks.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// The viewset action map, if any.
    pub fn action_map(&self) -> Option<&ActionMap> {
        self.action_map.as_ref()
    }

    /// The cloned request, if generation is permission scoped.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// Initialization keyword overrides bound to the callback.
    pub fn initkwargs(&self) -> &IndexMap<String, serde_json::Value> {
        &self.initkwargs
    }

    /// Looks up one initialization override.
    pub fn initkwarg(&self, name: &str) -> Option<&serde_json::Value> {
        self.initkwargs.get(name)
    }

    /// Positional URL arguments (always empty during introspection).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Keyword URL arguments (always empty during introspection).
    pub fn kwargs(&self) -> &IndexMap<String, String> {
        &self.kwargs
    }

    /// Format suffix hint (always `None` during introspection).
    pub fn format_kwarg(&self) -> Option<&str> {
        self.format_kwarg.as_deref()
    }
}

/// Builder for [`ViewContext`].
#[derive(Debug, Default)]
pub struct ViewContextBuilder {
    inner: ViewContext,
}

impl ViewContextBuilder {
    /// Sets the resolved action.
    pub fn action(mut self, action: Option<String>) -> Self {
        self.inner.action = action;
        self
    }

    /// Sets the action map.
    pub fn action_map(mut self, action_map: Option<ActionMap>) -> Self {
        self.inner.action_map = action_map;
        self
    }

    /// Attaches a request.
    pub fn request(mut self, request: Option<Request>) -> Self {
        self.inner.request = request;
        self
    }

    /// Sets the initialization overrides.
    pub fn initkwargs(mut self, initkwargs: IndexMap<String, serde_json::Value>) -> Self {
        self.inner.initkwargs = initkwargs;
        self
    }

    /// Finishes the context.
    pub fn build(self) -> ViewContext {
        self.inner
    }
}

/// Anything a routing callback can point at.
pub trait ViewHandler: Send + Sync {
    /// Display name of the handler.
    fn name(&self) -> &str;

    /// Capability marker: `Some` iff this handler is a REST view or viewset.
    fn as_api_view(&self) -> Option<&dyn ApiView> {
        None
    }
}

/// Hooks of the REST view abstraction consumed during schema generation.
pub trait ApiView: Send + Sync {
    /// Methods the view class declares, `OPTIONS`/`HEAD` included.
    fn allowed_methods(&self) -> Vec<HttpMethod>;

    /// Whether the view opts out of schema generation.
    fn exclude_from_schema(&self, ctx: &ViewContext) -> bool {
        let _ = ctx;
        false
    }

    /// The serializer used for request bodies.
    fn serializer(&self, ctx: &ViewContext) -> Option<Serializer> {
        let _ = ctx;
        None
    }

    /// Overall description text of the view.
    fn view_description(&self, ctx: &ViewContext) -> String {
        let _ = ctx;
        String::new()
    }

    /// Docstring of the handler method for `name` (an action or lowercase
    /// HTTP method), if it has one.
    fn action_doc(&self, name: &str) -> Option<String> {
        let _ = name;
        None
    }

    /// Configured paginator.
    fn pagination(&self, ctx: &ViewContext) -> Option<Arc<dyn Paginator>> {
        let _ = ctx;
        None
    }

    /// Configured filter backends, in order.
    fn filter_backends(&self, ctx: &ViewContext) -> Vec<Arc<dyn FilterBackend>> {
        let _ = ctx;
        Vec::new()
    }

    /// Media types of the configured parsers, in order.
    fn parser_media_types(&self, ctx: &ViewContext) -> Vec<String> {
        let _ = ctx;
        Vec::new()
    }

    /// Configured permission checks.
    fn permissions(&self, ctx: &ViewContext) -> Vec<Arc<dyn Permission>> {
        let _ = ctx;
        Vec::new()
    }

    /// Field names exposed to exact-match filtering.
    fn filter_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// Field names exposed to search filtering.
    fn search_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// Runs every permission; the first denial becomes an exception.
    fn check_permissions(&self, ctx: &ViewContext, request: &Request) -> Result<(), ApiException> {
        for permission in self.permissions(ctx) {
            if !permission.has_permission(request, ctx) {
                if !request.is_authenticated() {
                    return Err(ApiException::NotAuthenticated(
                        "Authentication credentials were not provided.".into(),
                    ));
                }
                return Err(ApiException::PermissionDenied(permission.message()));
            }
        }
        Ok(())
    }
}

/// A materialized view: the class hooks plus its request-scoped context.
#[derive(Clone)]
pub struct View<'a> {
    /// The view hooks.
    pub class: &'a dyn ApiView,
    /// Request-scoped state.
    pub ctx: ViewContext,
}

impl<'a> View<'a> {
    /// Pairs hooks with a context.
    pub fn new(class: &'a dyn ApiView, ctx: ViewContext) -> Self {
        Self { class, ctx }
    }

    /// The resolved viewset action, if any.
    pub fn action(&self) -> Option<&str> {
        self.ctx.action()
    }

    /// The attached request, if any.
    pub fn request(&self) -> Option<&Request> {
        self.ctx.request()
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("ctx", &self.ctx).finish()
    }
}

/// A single permission rule.
pub trait Permission: Send + Sync {
    /// Whether the request may use the view.
    fn has_permission(&self, request: &Request, ctx: &ViewContext) -> bool;

    /// Message used when the check fails.
    fn message(&self) -> String {
        "You do not have permission to perform this action.".into()
    }
}

/// Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl Permission for AllowAny {
    fn has_permission(&self, _request: &Request, _ctx: &ViewContext) -> bool {
        true
    }
}

/// Allows only authenticated users.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, request: &Request, _ctx: &ViewContext) -> bool {
        request.is_authenticated()
    }
}

/// Allows only staff users.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAdminUser;

impl Permission for IsAdminUser {
    fn has_permission(&self, request: &Request, _ctx: &ViewContext) -> bool {
        request.user.as_ref().is_some_and(|u| u.is_staff)
    }
}

/// Authenticated users may write; anyone may read.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticatedOrReadOnly;

impl Permission for IsAuthenticatedOrReadOnly {
    fn has_permission(&self, request: &Request, _ctx: &ViewContext) -> bool {
        request.method.is_safe() || request.is_authenticated()
    }
}
