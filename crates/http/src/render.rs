//! Spec component I: render a `ProjectList` / `ProjectDetail` as JSON or as
//! the canonical HTML string. JSON rendering is just `serde_json` (the
//! `Option::is_none` skip attributes on `ProjectFile` already implement the
//! "omit rather than null" rule); HTML is a hand-built string template, the
//! faithful port of an imperative HTML builder rather than a templating
//! engine (no templating dependency exists elsewhere in this stack).

use simple_index_core::model::{ProjectDetail, ProjectList};

pub fn project_list_json(list: &ProjectList) -> String {
    serde_json::to_string(list).expect("ProjectList always serializes")
}

pub fn project_detail_json(detail: &ProjectDetail) -> String {
    serde_json::to_string(detail).expect("ProjectDetail always serializes")
}

const HEAD: &str = concat!(
    "<meta charset=\"UTF-8\"/>",
    "<meta name=\"pypi:repository-version\" content=\"1.1\"/>",
);

/// Escape `&`, `<`, `>`, `"` for safe inclusion in an attribute or text node.
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// The project-listing page: one `<a>` per project, ascending by canonical
/// name (the order is already guaranteed by the query engine).
pub fn project_list_html(list: &ProjectList) -> String {
    let mut body = String::new();
    body.push_str("<!DOCTYPE html>\n<html>\n<head>");
    body.push_str(HEAD);
    body.push_str("<title>Simple index</title></head>\n<body>\n");
    for project in &list.projects {
        let escaped = html_escape(&project.name);
        body.push_str(&format!(
            "<a href=\"{escaped}/\">{escaped}</a>\n",
            escaped = escaped
        ));
    }
    body.push_str("</body>\n</html>");
    body
}

/// The project-detail page: one `<a>` per file, ascending by filename, with
/// a `#<algo>=<digest>` fragment and `data-requires-python` /
/// `data-core_metadata` attributes where applicable.
pub fn project_detail_html(detail: &ProjectDetail) -> String {
    let mut body = String::new();
    body.push_str("<!DOCTYPE html>\n<html>\n<head>");
    body.push_str(HEAD);
    body.push_str(&format!(
        "<title>Links for {name}</title></head>\n<body>\n<h1>Links for {name}</h1>\n",
        name = html_escape(&detail.name)
    ));

    for file in &detail.files {
        let mut attrs = String::new();
        if let Some(requires_python) = &file.requires_python {
            attrs.push_str(&format!(
                " data-requires-python=\"{}\"",
                html_escape(requires_python)
            ));
        }
        if let Some(core_metadata) = &file.core_metadata {
            if let Some(sha256) = core_metadata.get("sha256") {
                attrs.push_str(&format!(
                    " data-core_metadata=\"sha256={}\"",
                    html_escape(sha256)
                ));
            }
        }
        if let Some(yanked) = &file.yanked {
            attrs.push_str(&format!(" data-yanked=\"{}\"", html_escape(yanked)));
        }

        let fragment = file
            .hashes
            .get("sha256")
            .map(|digest| format!("#sha256={digest}"))
            .unwrap_or_default();

        body.push_str(&format!(
            "<a href=\"{url}{fragment}\"{attrs}>{filename}</a>\n",
            url = html_escape(&file.url),
            fragment = fragment,
            attrs = attrs,
            filename = html_escape(&file.filename),
        ));
    }

    body.push_str("</body>\n</html>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_index_core::model::{Meta, ProjectFile, ProjectListEntry};
    use std::collections::BTreeMap;

    #[test]
    fn escapes_requires_python_angle_brackets() {
        let mut hashes = BTreeMap::new();
        hashes.insert("sha256".to_string(), "deadbeef".to_string());
        let detail = ProjectDetail {
            meta: Meta::default(),
            name: "pytest".to_string(),
            versions: vec!["8.3".to_string()],
            files: vec![ProjectFile {
                filename: "pytest-8.3.0-py3-none-any.whl".to_string(),
                size: 10,
                url: "pytest-8.3.0-py3-none-any.whl".to_string(),
                hashes,
                requires_python: Some(">=3.8".to_string()),
                core_metadata: None,
                yanked: None,
                gpg_sig: None,
            }],
        };
        let html = project_detail_html(&detail);
        assert!(html.contains("data-requires-python=\"&gt;=3.8\""));
        assert!(html.contains("#sha256=deadbeef"));
    }

    #[test]
    fn lists_projects_in_order() {
        let list = ProjectList {
            meta: Meta::default(),
            projects: vec![
                ProjectListEntry { name: "iniconfig".to_string() },
                ProjectListEntry { name: "pytest".to_string() },
            ],
        };
        let html = project_list_html(&list);
        let i = html.find("iniconfig").unwrap();
        let p = html.find("pytest").unwrap();
        assert!(i < p);
    }
}
