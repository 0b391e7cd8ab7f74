//! # Schema Generator
//!
//! Turns the endpoints of a routing tree into a [`Document`].
//!
//! - **fields**: path / body / pagination / filter field extraction and
//!   request encoding.
//! - **description**: link descriptions from handler docs.
//! - **layout**: where each link sits in the document tree.

pub mod description;
pub mod fields;
pub mod layout;

use crate::document::{insert_into, Content, Document, Link};
use crate::inspector::{Endpoint, EndpointInspector};
use crate::urlconf::{Callback, UrlNode};
use crate::view::{HttpMethod, Request, View, ViewContext};
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

pub use layout::{is_custom_action, is_list_view};

/// Builds schema documents for one routing tree.
///
/// The endpoint list is computed on first use and reused afterwards.
#[derive(Debug)]
pub struct SchemaGenerator {
    title: Option<String>,
    url: Option<String>,
    patterns: Vec<UrlNode>,
    endpoints: OnceLock<Vec<Endpoint>>,
}

/// Ensures a trailing slash, and strips query and fragment from absolute URLs.
fn normalize_base_url(url: &str) -> String {
    let mut base = match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    };
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

impl SchemaGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    ///
    /// * `title` - Document title.
    /// * `url` - Base URL prefixed to every link; a trailing `/` is added.
    /// * `patterns` - The routing tree.
    pub fn new(title: Option<String>, url: Option<String>, patterns: Vec<UrlNode>) -> Self {
        Self {
            title,
            url: url.filter(|u| !u.is_empty()).map(|u| normalize_base_url(&u)),
            patterns,
            endpoints: OnceLock::new(),
        }
    }

    /// Document title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Normalized base URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The memoized endpoint list.
    pub fn endpoints(&self) -> &[Endpoint] {
        self.endpoints
            .get_or_init(|| EndpointInspector::new(self.patterns.clone()).get_api_endpoints())
    }

    /// Generates the schema document.
    ///
    /// With a request, only endpoints whose permission checks pass for it
    /// are included. Returns `None` when no link survives.
    pub fn get_schema(&self, request: Option<&Request>) -> Option<Document> {
        let links = self.get_links(request);
        if links.is_empty() {
            info!("schema generation produced no links");
            return None;
        }
        info!(groups = links.len(), "schema generated");
        Some(Document::new(self.title.clone(), self.url.clone(), links))
    }

    /// All links that should be included, laid out as a nested mapping.
    pub fn get_links(&self, request: Option<&Request>) -> Content {
        let mut links = Content::new();
        for endpoint in self.endpoints() {
            let (path, method) = (endpoint.path.as_str(), endpoint.method);
            let Some(view) = self.create_view(&endpoint.callback, method, request) else {
                continue;
            };
            if !self.should_include_view(path, method, &view) {
                debug!(%path, %method, "view excluded from schema");
                continue;
            }
            let link = self.get_link(path, method, &view);
            let keys = self.get_keys(path, method, &view);
            insert_into(&mut links, &keys, link);
        }
        links
    }

    /// Materializes a throwaway view for one endpoint.
    ///
    /// The action is `metadata` for OPTIONS, otherwise looked up in the
    /// callback's action map. A supplied request is cloned with the
    /// endpoint's method.
    pub fn create_view<'a>(
        &self,
        callback: &'a Callback,
        method: HttpMethod,
        request: Option<&Request>,
    ) -> Option<View<'a>> {
        let class = callback.handler.as_api_view()?;

        let action = callback.actions.as_ref().and_then(|actions| {
            if method == HttpMethod::Options {
                Some("metadata".to_string())
            } else {
                actions.get(&method.lowercase()).cloned()
            }
        });

        let ctx = ViewContext::builder()
            .initkwargs(callback.initkwargs.clone())
            .action_map(callback.actions.clone())
            .action(action)
            .request(request.map(|r| r.clone_with_method(method)))
            .build();

        Some(View::new(class, ctx))
    }

    /// Excluded views never appear; with a request attached, any permission
    /// failure hides the endpoint.
    pub fn should_include_view(&self, path: &str, method: HttpMethod, view: &View<'_>) -> bool {
        if view.class.exclude_from_schema(&view.ctx) {
            return false;
        }

        let Some(request) = view.request() else {
            return true;
        };

        match view.class.check_permissions(&view.ctx, request) {
            Ok(()) => true,
            Err(e) => {
                debug!(%path, %method, status = e.status_code(), "permission check failed");
                false
            }
        }
    }

    /// Builds the link for one endpoint.
    pub fn get_link(&self, path: &str, method: HttpMethod, view: &View<'_>) -> Link {
        let mut fields = self.get_path_fields(path, method, view);
        fields.extend(self.get_serializer_fields(path, method, view));
        fields.extend(self.get_pagination_fields(path, method, view));
        fields.extend(self.get_filter_fields(path, method, view));

        let encoding = if fields.iter().any(|f| f.location.is_body()) {
            self.get_encoding(path, method, view)
        } else {
            None
        };

        let description = self.get_description(path, method, view);

        let url = match &self.url {
            Some(base) => format!("{}{}", base, path.strip_prefix('/').unwrap_or(path)),
            None => path.to_string(),
        };

        Link {
            url,
            action: method.lowercase(),
            encoding,
            fields,
            description,
        }
    }
}
