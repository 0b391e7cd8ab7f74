//! # Filter Backends
//!
//! Filter backends declare the query parameters they read on list views.

use crate::pagination::QueryField;
use crate::view::View;

/// A list filtering strategy.
pub trait FilterBackend: Send + Sync {
    /// Query parameters this backend reads for the given view.
    fn get_fields(&self, view: &View<'_>) -> Vec<QueryField>;
}

/// Exact-match filtering on the view's declared filter fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DjangoFilterBackend;

impl FilterBackend for DjangoFilterBackend {
    fn get_fields(&self, view: &View<'_>) -> Vec<QueryField> {
        view.class
            .filter_fields()
            .into_iter()
            .map(QueryField::Name)
            .collect()
    }
}

/// Free-text search over the view's search fields. Views without search
/// fields get no search parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Search parameter.
    pub search_param: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            search_param: "search".into(),
        }
    }
}

impl FilterBackend for SearchFilter {
    fn get_fields(&self, view: &View<'_>) -> Vec<QueryField> {
        if view.class.search_fields().is_empty() {
            return Vec::new();
        }
        vec![QueryField::Name(self.search_param.clone())]
    }
}

/// Client-chosen ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingFilter {
    /// Ordering parameter.
    pub ordering_param: String,
}

impl Default for OrderingFilter {
    fn default() -> Self {
        Self {
            ordering_param: "ordering".into(),
        }
    }
}

impl FilterBackend for OrderingFilter {
    fn get_fields(&self, _view: &View<'_>) -> Vec<QueryField> {
        vec![QueryField::Name(self.ordering_param.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ApiView, HttpMethod, ViewContext};

    struct Accounts;

    impl ApiView for Accounts {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![HttpMethod::Get]
        }

        fn filter_fields(&self) -> Vec<String> {
            vec!["is_active".into(), "email".into()]
        }

        fn search_fields(&self) -> Vec<String> {
            vec!["email".into()]
        }
    }

    struct Unsearchable;

    impl ApiView for Unsearchable {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![HttpMethod::Get]
        }
    }

    #[test]
    fn test_django_filter_uses_view_fields() {
        let view = View::new(&Accounts, ViewContext::builder().build());
        assert_eq!(
            DjangoFilterBackend.get_fields(&view),
            vec![
                QueryField::Name("is_active".into()),
                QueryField::Name("email".into())
            ]
        );
    }

    #[test]
    fn test_search_and_ordering_params() {
        let view = View::new(&Accounts, ViewContext::builder().build());
        assert_eq!(
            SearchFilter::default().get_fields(&view),
            vec![QueryField::Name("search".into())]
        );
        let ordering = OrderingFilter {
            ordering_param: "sort".into(),
        };
        assert_eq!(ordering.get_fields(&view), vec![QueryField::Name("sort".into())]);
    }

    #[test]
    fn test_search_needs_search_fields() {
        let view = View::new(&Unsearchable, ViewContext::builder().build());
        assert!(SearchFilter::default().get_fields(&view).is_empty());
        assert_eq!(
            OrderingFilter::default().get_fields(&view),
            vec![QueryField::Name("ordering".into())]
        );
    }
}
