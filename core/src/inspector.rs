//! # Endpoint Inspector
//!
//! Walks a routing tree and lists the `(path, method, callback)` endpoints
//! that belong to the REST view abstraction.

use crate::urlconf::{path_from_regex, Callback, UrlNode};
use crate::view::HttpMethod;
use tracing::debug;

/// One routable endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// URI template, e.g. `/users/{pk}/`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Dispatch target.
    pub callback: Callback,
}

/// Sort key ordering endpoints by path, then conventional verb order.
pub fn endpoint_ordering(endpoint: &Endpoint) -> (&str, u8) {
    (endpoint.path.as_str(), endpoint.method.priority())
}

/// Determines the API endpoints a routing tree exposes.
#[derive(Debug, Clone)]
pub struct EndpointInspector {
    patterns: Vec<UrlNode>,
}

impl EndpointInspector {
    /// Creates an inspector over a routing tree.
    pub fn new(patterns: Vec<UrlNode>) -> Self {
        Self { patterns }
    }

    /// All API endpoints of the tree, sorted by [`endpoint_ordering`].
    pub fn get_api_endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints = self.collect(&self.patterns, "");
        endpoints.sort_by(|a, b| endpoint_ordering(a).cmp(&endpoint_ordering(b)));
        endpoints
    }

    fn collect(&self, patterns: &[UrlNode], prefix: &str) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();
        for pattern in patterns {
            let path_regex = format!("{}{}", prefix, pattern.regex());
            match pattern {
                UrlNode::Pattern(p) => {
                    let path = self.get_path_from_regex(&path_regex);
                    if !self.should_include_endpoint(&path, &p.callback) {
                        debug!(%path, handler = p.callback.handler.name(), "skipping endpoint");
                        continue;
                    }
                    for method in self.get_allowed_methods(&p.callback) {
                        endpoints.push(Endpoint {
                            path: path.clone(),
                            method,
                            callback: p.callback.clone(),
                        });
                    }
                }
                UrlNode::Resolver(r) => {
                    endpoints.extend(self.collect(&r.patterns, &path_regex));
                }
            }
        }
        endpoints
    }

    /// Given a URL conf regex, returns a URI template string.
    pub fn get_path_from_regex(&self, path_regex: &str) -> String {
        path_from_regex(path_regex)
    }

    /// Only REST views are included, and `.{format}` suffix routes are
    /// dropped as duplicates of the plain route.
    pub fn should_include_endpoint(&self, path: &str, callback: &Callback) -> bool {
        if !callback.is_api_view() {
            return false;
        }
        !(path.ends_with(".{format}") || path.ends_with(".{format}/"))
    }

    /// Valid HTTP methods for a callback: the action map's methods for
    /// viewsets, otherwise the view's declared methods minus OPTIONS/HEAD.
    pub fn get_allowed_methods(&self, callback: &Callback) -> Vec<HttpMethod> {
        if let Some(actions) = &callback.actions {
            return actions
                .keys()
                .filter_map(|method| match method.parse::<HttpMethod>() {
                    Ok(m) => Some(m),
                    Err(e) => {
                        debug!(error = %e, "ignoring action map entry");
                        None
                    }
                })
                .collect();
        }

        let Some(view) = callback.handler.as_api_view() else {
            return Vec::new();
        };
        view.allowed_methods()
            .into_iter()
            .filter(|m| !matches!(m, HttpMethod::Options | HttpMethod::Head))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urlconf::PlainView;
    use crate::view::{ActionMap, ApiView, ViewHandler};
    use std::sync::Arc;

    struct Crud;

    impl ViewHandler for Crud {
        fn name(&self) -> &str {
            "Crud"
        }
        fn as_api_view(&self) -> Option<&dyn ApiView> {
            Some(self)
        }
    }

    impl ApiView for Crud {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![
                HttpMethod::Delete,
                HttpMethod::Get,
                HttpMethod::Head,
                HttpMethod::Options,
                HttpMethod::Put,
            ]
        }
    }

    fn actions(pairs: &[(&str, &str)]) -> ActionMap {
        pairs
            .iter()
            .map(|(m, a)| (m.to_string(), a.to_string()))
            .collect()
    }

    fn tree() -> Vec<UrlNode> {
        let crud: Arc<dyn ViewHandler> = Arc::new(Crud);
        vec![
            UrlNode::include(
                "^api/",
                vec![
                    UrlNode::pattern(
                        r"^users/(?P<pk>[^/.]+)/$",
                        Callback::with_actions(
                            crud.clone(),
                            actions(&[("delete", "destroy"), ("get", "retrieve")]),
                        ),
                    ),
                    UrlNode::pattern(
                        "^users/$",
                        Callback::with_actions(
                            crud.clone(),
                            actions(&[("post", "create"), ("get", "list")]),
                        ),
                    ),
                    UrlNode::pattern(
                        r"^users\.(?P<format>[a-z0-9]+)/?$",
                        Callback::new(crud.clone()),
                    ),
                ],
            ),
            UrlNode::pattern("^admin/$", Callback::new(Arc::new(PlainView::new("admin")))),
            UrlNode::pattern("^health/$", Callback::new(crud)),
        ]
    }

    #[test]
    fn test_endpoints_sorted_and_filtered() {
        let endpoints = EndpointInspector::new(tree()).get_api_endpoints();
        let listed: Vec<String> = endpoints
            .iter()
            .map(|e| format!("{} {}", e.method, e.path))
            .collect();
        assert_eq!(
            listed,
            vec![
                "GET /api/users/",
                "POST /api/users/",
                "GET /api/users/{pk}/",
                "DELETE /api/users/{pk}/",
                "GET /health/",
                "PUT /health/",
                "DELETE /health/",
            ]
        );
    }

    #[test]
    fn test_format_suffix_excluded() {
        let inspector = EndpointInspector::new(vec![]);
        let cb = Callback::new(Arc::new(Crud));
        assert!(!inspector.should_include_endpoint("/users.{format}", &cb));
        assert!(!inspector.should_include_endpoint("/users.{format}/", &cb));
        assert!(inspector.should_include_endpoint("/users/", &cb));
    }

    #[test]
    fn test_non_api_callback_excluded() {
        let inspector = EndpointInspector::new(vec![]);
        let cb = Callback::new(Arc::new(PlainView::new("static")));
        assert!(!inspector.should_include_endpoint("/static/", &cb));
        assert!(inspector.get_allowed_methods(&cb).is_empty());
    }

    #[test]
    fn test_allowed_methods_from_action_map() {
        let inspector = EndpointInspector::new(vec![]);
        let cb = Callback::with_actions(
            Arc::new(Crud),
            actions(&[("get", "list"), ("bogus", "x"), ("patch", "partial_update")]),
        );
        assert_eq!(
            inspector.get_allowed_methods(&cb),
            vec![HttpMethod::Get, HttpMethod::Patch]
        );
    }
}
