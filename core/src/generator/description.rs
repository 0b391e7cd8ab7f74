//! # Link Descriptions

use super::SchemaGenerator;
use crate::view::{HttpMethod, View};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Removes the common leading indentation of all lines but the first, then
/// trims the result.
pub fn dedent(content: &str) -> String {
    let indent = content
        .lines()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min();

    let dedented = match indent {
        Some(n) if n > 0 => content
            .lines()
            .map(|line| {
                let spaces = line.len() - line.trim_start_matches(' ').len();
                &line[spaces.min(n)..]
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => content.to_string(),
    };
    dedented.trim().to_string()
}

/// Splits a view description into sections headed by `name:` lines. The
/// text before any header is stored under the empty key.
pub fn description_sections(description: &str) -> IndexMap<String, String> {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    let header_re =
        HEADER_RE.get_or_init(|| Regex::new(r"^[a-zA-Z][0-9A-Za-z_]*:").expect("Invalid regex"));

    let mut sections: IndexMap<String, String> = IndexMap::new();
    sections.insert(String::new(), String::new());
    let mut current = String::new();

    for line in description.lines().map(str::trim) {
        if header_re.is_match(line) {
            let (name, lead) = line.split_once(':').unwrap_or((line, ""));
            current = name.to_string();
            sections.insert(current.clone(), lead.trim().to_string());
        } else {
            // Continuation lines keep their line breaks.
            let section = sections.entry(current.clone()).or_default();
            section.push('\n');
            section.push_str(line);
        }
    }

    sections
        .into_iter()
        .map(|(name, text)| (name, text.trim().to_string()))
        .collect()
}

impl SchemaGenerator {
    /// Link description: the handler's own doc if it has one, otherwise the
    /// matching section of the view description.
    pub fn get_description(&self, _path: &str, method: HttpMethod, view: &View<'_>) -> String {
        let name = view
            .action()
            .map(str::to_string)
            .unwrap_or_else(|| method.lowercase());

        if let Some(doc) = view.class.action_doc(&name).filter(|d| !d.trim().is_empty()) {
            return dedent(&doc);
        }

        let mut sections = description_sections(&view.class.view_description(&view.ctx));
        sections
            .swap_remove(&name)
            .or_else(|| sections.swap_remove(""))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ApiView, ViewContext};

    struct Documented;

    impl ApiView for Documented {
        fn allowed_methods(&self) -> Vec<HttpMethod> {
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]
        }

        fn view_description(&self, _ctx: &ViewContext) -> String {
            "Manage users.\n\nget: Return all users.\n  Paginated.\npost: Create a user.".into()
        }

        fn action_doc(&self, name: &str) -> Option<String> {
            (name == "delete").then(|| "Remove a user.\n\n    Irreversible.\n".to_string())
        }
    }

    fn describe(method: HttpMethod) -> String {
        let view = View::new(&Documented, ViewContext::builder().build());
        SchemaGenerator::new(None, None, vec![]).get_description("/users/", method, &view)
    }

    #[test]
    fn test_section_lookup() {
        assert_eq!(describe(HttpMethod::Get), "Return all users.\nPaginated.");
        assert_eq!(describe(HttpMethod::Post), "Create a user.");
    }

    #[test]
    fn test_continuation_lines_keep_breaks() {
        let sections = description_sections("get: A.\n  B.\npost:\n  C.\n  D.");
        assert_eq!(sections["get"], "A.\nB.");
        assert_eq!(sections["post"], "C.\nD.");
        assert_eq!(sections[""], "");
    }

    #[test]
    fn test_method_doc_wins() {
        assert_eq!(describe(HttpMethod::Delete), "Remove a user.\n\nIrreversible.");
    }

    #[test]
    fn test_unlabeled_fallback() {
        assert_eq!(describe(HttpMethod::Put), "Manage users.");
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("Title\n    line one\n      line two\n"), "Title\nline one\n  line two");
        assert_eq!(dedent("  single  "), "single");
    }
}
