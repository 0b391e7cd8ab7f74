//! # Link Layout
//!
//! Decides the key path of each link inside the document:
//!
//! ```text
//! /users/                   ("users", "list"), ("users", "create")
//! /users/{pk}/              ("users", "retrieve"), ("users", "update"), ("users", "destroy")
//! /users/enabled/           ("users", "enabled")  # custom viewset list action
//! /users/{pk}/star/         ("users", "star")     # custom viewset detail action
//! /users/{pk}/groups/       ("users", "groups", "list"), ("users", "groups", "create")
//! ```

use super::SchemaGenerator;
use crate::view::{HttpMethod, View};

/// Viewset actions that follow the standard CRUD naming.
const STANDARD_ACTIONS: [&str; 6] = [
    "retrieve",
    "list",
    "create",
    "update",
    "partial_update",
    "destroy",
];

/// True for viewset actions outside the standard CRUD set.
pub fn is_custom_action(action: &str) -> bool {
    !STANDARD_ACTIONS.contains(&action)
}

/// Whether the endpoint returns a collection.
///
/// Viewsets answer through their action; plain views are list views when
/// they handle GET and the last path segment is not a template variable.
pub fn is_list_view(path: &str, method: HttpMethod, view: &View<'_>) -> bool {
    if let Some(action) = view.action() {
        return action == "list";
    }
    if method != HttpMethod::Get {
        return false;
    }
    !path
        .trim_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(|last| last.contains('{'))
}

/// Action name a plain view's method maps onto.
pub fn default_action(method: HttpMethod) -> String {
    match method {
        HttpMethod::Get => "retrieve".into(),
        HttpMethod::Post => "create".into(),
        HttpMethod::Put => "update".into(),
        HttpMethod::Patch => "partial_update".into(),
        HttpMethod::Delete => "destroy".into(),
        other => other.lowercase(),
    }
}

impl SchemaGenerator {
    /// Key path under which the endpoint's link is inserted.
    pub fn get_keys(&self, path: &str, method: HttpMethod, view: &View<'_>) -> Vec<String> {
        let mut keys: Vec<String> = path
            .trim_matches('/')
            .split('/')
            .filter(|component| !component.is_empty() && !component.contains('{'))
            .map(str::to_string)
            .collect();

        let Some(action) = view.action() else {
            let action = if is_list_view(path, method, view) {
                "list".to_string()
            } else {
                default_action(method)
            };
            keys.push(action);
            return keys;
        };

        if is_custom_action(action) {
            let declared = view.ctx.action_map().map_or(0, |m| m.len());
            if declared > 1 {
                // Multi-method custom actions fall back to CRUD naming.
                keys.push(default_action(method));
            } else {
                keys.pop();
                keys.push(action.to_string());
            }
            return keys;
        }

        keys.push(action.to_string());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ActionMap, ApiView, ViewContext};

    struct Users;

    impl ApiView for Users {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![HttpMethod::Get, HttpMethod::Post]
        }
    }

    fn plain() -> View<'static> {
        View::new(&Users, ViewContext::builder().build())
    }

    fn viewset(action: &str, methods: &[&str]) -> View<'static> {
        let map: ActionMap = methods
            .iter()
            .map(|m| (m.to_string(), action.to_string()))
            .collect();
        View::new(
            &Users,
            ViewContext::builder()
                .action(Some(action.into()))
                .action_map(Some(map))
                .build(),
        )
    }

    fn keys(path: &str, method: HttpMethod, view: &View<'_>) -> Vec<String> {
        SchemaGenerator::new(None, None, vec![]).get_keys(path, method, view)
    }

    #[test]
    fn test_plain_view_keys() {
        assert_eq!(
            keys("/users/{pk}/groups/", HttpMethod::Get, &plain()),
            vec!["users", "groups", "list"]
        );
        assert_eq!(
            keys("/users/{pk}/groups/", HttpMethod::Post, &plain()),
            vec!["users", "groups", "create"]
        );
        assert_eq!(
            keys("/users/{pk}/", HttpMethod::Get, &plain()),
            vec!["users", "retrieve"]
        );
        assert_eq!(
            keys("/users/{pk}/", HttpMethod::Patch, &plain()),
            vec!["users", "partial_update"]
        );
    }

    #[test]
    fn test_root_path_has_no_empty_segment() {
        assert_eq!(keys("/", HttpMethod::Get, &plain()), vec!["list"]);
        assert_eq!(keys("/", HttpMethod::Post, &plain()), vec!["create"]);
        assert_eq!(
            keys("/", HttpMethod::Get, &viewset("list", &["get"])),
            vec!["list"]
        );
        assert_eq!(
            keys("/{pk}/", HttpMethod::Get, &viewset("retrieve", &["get"])),
            vec!["retrieve"]
        );
    }

    #[test]
    fn test_viewset_standard_action_keys() {
        assert_eq!(
            keys("/users/{pk}/", HttpMethod::Delete, &viewset("destroy", &["delete"])),
            vec!["users", "destroy"]
        );
    }

    #[test]
    fn test_custom_single_method_action_replaces_segment() {
        assert_eq!(
            keys("/users/{pk}/star/", HttpMethod::Post, &viewset("star", &["post"])),
            vec!["users", "star"]
        );
        assert_eq!(
            keys("/users/enabled/", HttpMethod::Get, &viewset("enabled", &["get"])),
            vec!["users", "enabled"]
        );
    }

    #[test]
    fn test_custom_multi_method_action_uses_crud_naming() {
        let view = viewset("star", &["post", "delete"]);
        assert_eq!(
            keys("/users/{pk}/star/", HttpMethod::Post, &view),
            vec!["users", "star", "create"]
        );
        assert_eq!(
            keys("/users/{pk}/star/", HttpMethod::Delete, &view),
            vec!["users", "star", "destroy"]
        );
    }

    #[test]
    fn test_is_list_view() {
        assert!(is_list_view("/users/", HttpMethod::Get, &plain()));
        assert!(!is_list_view("/users/", HttpMethod::Post, &plain()));
        assert!(!is_list_view("/users/{pk}/", HttpMethod::Get, &plain()));
        assert!(is_list_view("/users/{pk}/groups/", HttpMethod::Get, &plain()));
        assert!(is_list_view("/users/{pk}/", HttpMethod::Get, &viewset("list", &["get"])));
        assert!(!is_list_view("/users/", HttpMethod::Get, &viewset("retrieve", &["get"])));
    }

    #[test]
    fn test_custom_action_set() {
        assert!(!is_custom_action("partial_update"));
        assert!(is_custom_action("metadata"));
        assert!(is_custom_action("star"));
    }
}
