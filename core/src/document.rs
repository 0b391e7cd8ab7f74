//! # Schema Document
//!
//! The hypermedia primitives produced by the generator: a `Document` whose
//! content is a tree of named groupings with `Link` leaves, each link
//! carrying the `Field`s it accepts.

use indexmap::IndexMap;
use std::fmt;

/// Where a field is sent in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// A templated URL variable.
    Path,
    /// A query-string parameter.
    Query,
    /// One member of an encoded request body.
    Form,
    /// The whole request body.
    Body,
}

impl Location {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Form => "form",
            Location::Body => "body",
        }
    }

    /// True for locations that travel in the request body.
    pub fn is_body(&self) -> bool {
        matches!(self, Location::Form | Location::Body)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named input parameter of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Parameter name.
    pub name: String,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Where the parameter is sent.
    pub location: Location,
    /// Primitive type name (`string`, `integer`, ...), empty when unknown.
    pub type_: String,
    /// Free-text description.
    pub description: String,
}

impl Field {
    /// Creates an optional, untyped field.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            required: false,
            location,
            type_: String::new(),
            description: String::new(),
        }
    }

    /// Sets the `required` flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the primitive type name.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = type_.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The callable contract of a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    /// URL template, `{name}` placeholders.
    pub url: String,
    /// Lowercased HTTP method.
    pub action: String,
    /// Request media type, if the link sends a body.
    pub encoding: Option<String>,
    /// Ordered input parameters.
    pub fields: Vec<Field>,
    /// Human readable description.
    pub description: String,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf link.
    Link(Link),
    /// A named grouping of further nodes.
    Object(Content),
}

impl Node {
    /// Returns the link if this node is a leaf.
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Node::Link(link) => Some(link),
            Node::Object(_) => None,
        }
    }

    /// Returns the nested mapping if this node is a grouping.
    pub fn as_object(&self) -> Option<&Content> {
        match self {
            Node::Object(content) => Some(content),
            Node::Link(_) => None,
        }
    }
}

/// Insertion-ordered mapping of keys to nodes.
pub type Content = IndexMap<String, Node>;

/// The full schema returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// API title.
    pub title: Option<String>,
    /// Base URL of the API.
    pub url: Option<String>,
    /// The nested link tree.
    pub content: Content,
}

impl Document {
    /// Creates a document around an existing content tree.
    pub fn new(title: Option<String>, url: Option<String>, content: Content) -> Self {
        Self {
            title,
            url,
            content,
        }
    }

    /// Looks a node up by key path.
    pub fn get(&self, keys: &[&str]) -> Option<&Node> {
        let (last, parents) = keys.split_last()?;
        let mut target = &self.content;
        for key in parents {
            target = target.get(*key)?.as_object()?;
        }
        target.get(*last)
    }

    /// Looks a link up by key path.
    pub fn link(&self, keys: &[&str]) -> Option<&Link> {
        self.get(keys).and_then(Node::as_link)
    }

    /// All links, depth first, with their key paths.
    pub fn links(&self) -> Vec<(Vec<String>, &Link)> {
        let mut out = Vec::new();
        collect_links(&self.content, &mut Vec::new(), &mut out);
        out
    }
}

fn collect_links<'a>(
    content: &'a Content,
    prefix: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a Link)>,
) {
    for (key, node) in content {
        prefix.push(key.clone());
        match node {
            Node::Link(link) => out.push((prefix.clone(), link)),
            Node::Object(inner) => collect_links(inner, prefix, out),
        }
        prefix.pop();
    }
}

/// Nested mapping insertion.
///
/// Intermediate mappings are created on demand. A link sitting where a
/// mapping is needed is replaced by an empty mapping, and a link already
/// stored under the final key is overwritten.
///
/// ```
/// use apischema_core::document::{insert_into, Content, Link};
///
/// let mut content = Content::new();
/// insert_into(&mut content, &["a", "b", "c"], Link::default());
/// assert!(content["a"].as_object().unwrap()["b"].as_object().is_some());
/// ```
pub fn insert_into<S: AsRef<str>>(target: &mut Content, keys: &[S], value: Link) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut target = target;
    for key in parents {
        let node = target
            .entry(key.as_ref().to_string())
            .or_insert_with(|| Node::Object(Content::new()));
        if !matches!(node, Node::Object(_)) {
            *node = Node::Object(Content::new());
        }
        let Node::Object(inner) = node else {
            return;
        };
        target = inner;
    }
    target.insert(last.as_ref().to_string(), Node::Link(value));
}
