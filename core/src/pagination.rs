//! # Pagination
//!
//! Paginators declare the query parameters they read so list endpoints can
//! advertise them.

use crate::document::{Field, Location};
use crate::view::View;

/// A query parameter declaration: either a bare name or a full field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryField {
    /// Plain parameter name.
    Name(String),
    /// Fully described field.
    Field(Field),
}

impl From<&str> for QueryField {
    fn from(name: &str) -> Self {
        QueryField::Name(name.to_string())
    }
}

impl From<Field> for QueryField {
    fn from(field: Field) -> Self {
        QueryField::Field(field)
    }
}

/// Converts bare names into optional `query` fields.
pub fn as_query_fields(items: Vec<QueryField>) -> Vec<Field> {
    items
        .into_iter()
        .map(|item| match item {
            QueryField::Field(field) => field,
            QueryField::Name(name) => Field::new(name, Location::Query),
        })
        .collect()
}

/// Pagination style of a list view.
pub trait Paginator: Send + Sync {
    /// Query parameters this paginator reads.
    fn get_fields(&self, view: &View<'_>) -> Vec<QueryField>;
}

/// `?page=N`, optionally with a client-controlled page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumberPagination {
    /// Page number parameter.
    pub page_query_param: String,
    /// Page size parameter, if clients may choose it.
    pub page_size_query_param: Option<String>,
}

impl Default for PageNumberPagination {
    fn default() -> Self {
        Self {
            page_query_param: "page".into(),
            page_size_query_param: None,
        }
    }
}

impl Paginator for PageNumberPagination {
    fn get_fields(&self, _view: &View<'_>) -> Vec<QueryField> {
        let mut fields = vec![QueryField::Name(self.page_query_param.clone())];
        if let Some(size) = &self.page_size_query_param {
            fields.push(QueryField::Name(size.clone()));
        }
        fields
    }
}

/// `?limit=N&offset=M`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOffsetPagination {
    /// Limit parameter.
    pub limit_query_param: String,
    /// Offset parameter.
    pub offset_query_param: String,
}

impl Default for LimitOffsetPagination {
    fn default() -> Self {
        Self {
            limit_query_param: "limit".into(),
            offset_query_param: "offset".into(),
        }
    }
}

impl Paginator for LimitOffsetPagination {
    fn get_fields(&self, _view: &View<'_>) -> Vec<QueryField> {
        vec![
            QueryField::Name(self.limit_query_param.clone()),
            QueryField::Name(self.offset_query_param.clone()),
        ]
    }
}

/// Opaque cursor pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPagination {
    /// Cursor parameter.
    pub cursor_query_param: String,
}

impl Default for CursorPagination {
    fn default() -> Self {
        Self {
            cursor_query_param: "cursor".into(),
        }
    }
}

impl Paginator for CursorPagination {
    fn get_fields(&self, _view: &View<'_>) -> Vec<QueryField> {
        vec![QueryField::Name(self.cursor_query_param.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ApiView, HttpMethod, ViewContext};

    struct Plain;

    impl ApiView for Plain {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![HttpMethod::Get]
        }
    }

    #[test]
    fn test_as_query_fields() {
        let described = Field::new("cursor", Location::Query)
            .with_description("Opaque position")
            .required(true);
        let fields = as_query_fields(vec!["page".into(), described.clone().into()]);
        assert_eq!(fields[0], Field::new("page", Location::Query));
        assert!(!fields[0].required);
        assert_eq!(fields[1], described);
    }

    #[test]
    fn test_page_number_fields() {
        let view = View::new(&Plain, ViewContext::builder().build());
        let paginator = PageNumberPagination {
            page_size_query_param: Some("page_size".into()),
            ..Default::default()
        };
        let names: Vec<Field> = as_query_fields(paginator.get_fields(&view));
        let names: Vec<&str> = names.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["page", "page_size"]);
    }

    #[test]
    fn test_limit_offset_and_cursor_fields() {
        let view = View::new(&Plain, ViewContext::builder().build());
        assert_eq!(LimitOffsetPagination::default().get_fields(&view).len(), 2);
        assert_eq!(
            CursorPagination::default().get_fields(&view),
            vec![QueryField::Name("cursor".into())]
        );
    }
}
