//! # URL Configuration
//!
//! The routing tree walked by the endpoint inspector, and helpers turning
//! its regex patterns into `{name}` URI templates.

use crate::view::{ActionMap, ViewHandler};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// What a leaf pattern dispatches to.
#[derive(Clone)]
pub struct Callback {
    /// The view handler.
    pub handler: Arc<dyn ViewHandler>,
    /// Method → action map; present only for viewset routes.
    pub actions: Option<ActionMap>,
    /// Attribute overrides bound when the route was declared.
    pub initkwargs: IndexMap<String, serde_json::Value>,
}

impl Callback {
    /// A callback for a plain view.
    pub fn new(handler: Arc<dyn ViewHandler>) -> Self {
        Self {
            handler,
            actions: None,
            initkwargs: IndexMap::new(),
        }
    }

    /// A callback for a viewset route with an action map.
    pub fn with_actions(handler: Arc<dyn ViewHandler>, actions: ActionMap) -> Self {
        Self {
            handler,
            actions: Some(actions),
            initkwargs: IndexMap::new(),
        }
    }

    /// Adds an initialization override.
    pub fn initkwarg(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.initkwargs.insert(name.into(), value);
        self
    }

    /// True if the handler belongs to the REST view abstraction.
    pub fn is_api_view(&self) -> bool {
        self.handler.as_api_view().is_some()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("handler", &self.handler.name())
            .field("actions", &self.actions)
            .field("initkwargs", &self.initkwargs)
            .finish()
    }
}

/// A handler outside the REST view abstraction (admin pages, static views, ...).
#[derive(Debug, Clone)]
pub struct PlainView {
    name: String,
}

impl PlainView {
    /// Creates a named plain handler.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ViewHandler for PlainView {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A leaf route bound to a callback.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    /// Regex pattern, relative to the enclosing resolver.
    pub regex: String,
    /// Dispatch target.
    pub callback: Callback,
    /// Optional route name.
    pub name: Option<String>,
}

/// An interior node mounting a sub-tree under a prefix.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    /// Regex prefix.
    pub regex: String,
    /// Nested routes.
    pub patterns: Vec<UrlNode>,
}

/// A node of the routing tree.
#[derive(Debug, Clone)]
pub enum UrlNode {
    /// Leaf route.
    Pattern(UrlPattern),
    /// Nested sub-tree.
    Resolver(UrlResolver),
}

impl UrlNode {
    /// Shorthand for a leaf node.
    pub fn pattern(regex: impl Into<String>, callback: Callback) -> Self {
        UrlNode::Pattern(UrlPattern {
            regex: regex.into(),
            callback,
            name: None,
        })
    }

    /// Shorthand for a resolver node.
    pub fn include(regex: impl Into<String>, patterns: Vec<UrlNode>) -> Self {
        UrlNode::Resolver(UrlResolver {
            regex: regex.into(),
            patterns,
        })
    }

    /// The node's own regex fragment.
    pub fn regex(&self) -> &str {
        match self {
            UrlNode::Pattern(p) => &p.regex,
            UrlNode::Resolver(r) => &r.regex,
        }
    }
}

/// Index just past the `)` closing the group opened at `open`.
fn group_end(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn starts_with_at(chars: &[char], at: usize, prefix: &str) -> bool {
    prefix
        .chars()
        .enumerate()
        .all(|(k, c)| chars.get(at + k) == Some(&c))
}

/// Collapses regex groups: named groups become `<name>`, other capturing
/// groups become `<var>`, lookarounds and comments disappear.
fn replace_groups(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.get(i + 1) {
                out.push(*next);
            }
            i += 2;
            continue;
        }
        if c != '(' {
            out.push(c);
            i += 1;
            continue;
        }
        let Some(end) = group_end(&chars, i) else {
            out.extend(&chars[i..]);
            break;
        };
        if starts_with_at(&chars, i, "(?P<") {
            let name: String = chars[i + 4..end]
                .iter()
                .take_while(|c| **c != '>')
                .collect();
            out.push('<');
            out.push_str(&name);
            out.push('>');
        } else if ["(?=", "(?!", "(?<=", "(?<!", "(?#", "(?P="]
            .iter()
            .all(|p| !starts_with_at(&chars, i, p))
        {
            out.push_str("<var>");
        }
        i = end;
    }
    out
}

/// Turns a URL regex into a readable path, e.g.
/// `^users/(?P<pk>[^/.]+)/$` → `/users/<pk>/`.
pub fn simplify_regex(pattern: &str) -> String {
    let mut path = replace_groups(pattern)
        .replace(['^', '$', '?'], "")
        .replace("//", "/")
        .replace('\\', "");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    path
}

/// Given a URL regex, returns a `{name}` URI template.
pub fn path_from_regex(pattern: &str) -> String {
    simplify_regex(pattern).replace('<', "{").replace('>', "}")
}

/// Variable names of a URI template, in first-seen order, without duplicates.
pub fn template_variables(template: &str) -> Vec<String> {
    static EXPRESSION_RE: OnceLock<Regex> = OnceLock::new();
    let expression_re =
        EXPRESSION_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));

    let mut names: Vec<String> = Vec::new();
    for caps in expression_re.captures_iter(template) {
        let expression = caps[1]
            .trim_start_matches(['+', '#', '.', '/', ';', '?', '&', '=', ',', '!', '@', '|']);
        for spec in expression.split(',') {
            let name = spec.split(':').next().unwrap_or(spec).trim_end_matches('*');
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_named_groups() {
        assert_eq!(simplify_regex(r"^users/(?P<pk>[^/.]+)/$"), "/users/<pk>/");
        assert_eq!(
            simplify_regex(r"^(?P<a>(x|y))/b/(?P<c>\w+)$"),
            "/<a>/b/<c>"
        );
    }

    #[test]
    fn test_simplify_unnamed_and_escapes() {
        assert_eq!(simplify_regex(r"^archive/(\d{4})/$"), "/archive/<var>/");
        assert_eq!(simplify_regex(r"^docs\.json$"), "/docs.json");
        assert_eq!(simplify_regex(r"^a/(?=b)c/?$"), "/a/c/");
        assert_eq!(simplify_regex(r"^item/(?P<x>[()]+)/$"), "/item/<x>/");
    }

    #[test]
    fn test_simplify_joined_prefix() {
        assert_eq!(simplify_regex(r"^api/^users/$"), "/api/users/");
        assert_eq!(simplify_regex(""), "/");
    }

    #[test]
    fn test_path_from_regex_format_suffix() {
        assert_eq!(
            path_from_regex(r"^users\.(?P<format>[a-z0-9]+)/?$"),
            "/users.{format}/"
        );
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(
            template_variables("/users/{pk}/groups/{group_pk}/"),
            vec!["pk", "group_pk"]
        );
        assert_eq!(template_variables("/a/{id}/{id}/"), vec!["id"]);
        assert_eq!(template_variables("/search{?q,page}"), vec!["q", "page"]);
        assert_eq!(template_variables("/files/{+path*}/{x:3}"), vec!["path", "x"]);
        assert!(template_variables("/users/").is_empty());
    }

    #[test]
    fn test_callback_capability() {
        let plain = Callback::new(Arc::new(PlainView::new("admin")));
        assert!(!plain.is_api_view());
        assert_eq!(UrlNode::pattern("^admin/$", plain).regex(), "^admin/$");
    }
}
