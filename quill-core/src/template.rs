//! Template rendering seam.
//!
//! [`FileTemplates`] renders Jinja-style templates from a directory with
//! `minijinja`: loops, conditionals, inheritance and filters. Templates ending
//! in `.html` are auto-escaped; `| tojson` embeds a value in a script and
//! `| safe` inserts already-rendered HTML as is.

use std::path::Path;
use std::sync::Arc;

use minijinja::{path_loader, Environment};

use crate::error::HttpError;

pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, HttpError>;
}

impl<T: TemplateRenderer> TemplateRenderer for Arc<T> {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, HttpError> {
        (**self).render(name, context)
    }
}

/// Templates loaded from a directory and cached after the first read.
///
/// Names resolve relative to the directory; names escaping it are not found.
///
/// ```ignore
/// let templates = FileTemplates::new("templates")
///     .configure(|env| env.add_filter("shout", |s: String| s.to_uppercase()));
/// ```
pub struct FileTemplates {
    env: Environment<'static>,
}

impl FileTemplates {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        Self { env }
    }

    /// Adjust the environment, typically to register filters and globals.
    pub fn configure(mut self, f: impl FnOnce(&mut Environment<'static>)) -> Self {
        f(&mut self.env);
        self
    }
}

impl TemplateRenderer for FileTemplates {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, HttpError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| HttpError::Internal(format!("Template {name}: {e}")))?;
        template.render(context).map_err(|e| {
            tracing::error!(template = name, error = %e, "template render failed");
            HttpError::Internal(format!("Template {name}: {e}"))
        })
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn templates(files: &[(&str, &str)]) -> (tempfile::TempDir, FileTemplates) {
        let dir = tempfile::tempdir().unwrap();
        for (name, src) in files {
            std::fs::write(dir.path().join(name), src).unwrap();
        }
        let templates = FileTemplates::new(dir.path());
        (dir, templates)
    }

    #[test]
    fn html_templates_escape_values() {
        let (_dir, t) = templates(&[("page.html", "<h1>{{ blog.name }}</h1> {{ n }}")]);
        let out = t
            .render("page.html", &json!({"blog": {"name": "<b>Rust & co"}, "n": 3}))
            .unwrap();
        assert_eq!(out, "<h1>&lt;b&gt;Rust &amp; co</h1> 3");
    }

    #[test]
    fn loops_and_conditionals() {
        let (_dir, t) = templates(&[(
            "list.html",
            "{% for b in blogs %}<li>{{ b.name }}</li>{% else %}none{% endfor %}\
             {% if __user__ %}|{{ __user__.name }}{% endif %}",
        )]);
        let out = t
            .render(
                "list.html",
                &json!({"blogs": [{"name": "a"}, {"name": "b"}], "__user__": {"name": "Ann"}}),
            )
            .unwrap();
        assert_eq!(out, "<li>a</li><li>b</li>|Ann");
        let out = t
            .render("list.html", &json!({"blogs": [], "__user__": null}))
            .unwrap();
        assert_eq!(out, "none");
    }

    #[test]
    fn tojson_keeps_script_tags_closed() {
        let (_dir, t) = templates(&[("s.html", "var u = {{ __user__ | tojson }};")]);
        let out = t
            .render("s.html", &json!({"__user__": {"name": "a</script>"}}))
            .unwrap();
        assert!(!out.contains("</script>"), "{out}");
        assert!(out.starts_with(r#"var u = {"name":"a"#), "{out}");
    }

    #[test]
    fn safe_filter_skips_escaping() {
        let (_dir, t) = templates(&[("h.html", "{{ html | safe }}")]);
        let out = t.render("h.html", &json!({"html": "<p>a &amp; b</p>"})).unwrap();
        assert_eq!(out, "<p>a &amp; b</p>");
    }

    #[test]
    fn configured_filters_are_available() {
        let (_dir, t) = templates(&[("f.html", "{{ name | shout }}")]);
        let t = t.configure(|env| env.add_filter("shout", |s: String| s.to_uppercase()));
        assert_eq!(t.render("f.html", &json!({"name": "ann"})).unwrap(), "ANN");
    }

    #[test]
    fn missing_values_render_empty() {
        let (_dir, t) = templates(&[("m.html", "[{{ nope }}]")]);
        assert_eq!(t.render("m.html", &json!({})).unwrap(), "[]");
    }

    #[test]
    fn unknown_or_escaping_names_fail() {
        let (_dir, t) = templates(&[("hello.html", "Hi {{ name }}")]);
        assert_eq!(t.render("hello.html", &json!({"name": "Ann"})).unwrap(), "Hi Ann");
        assert!(t.render("missing.html", &json!({})).is_err());
        assert!(t.render("../etc/passwd", &json!({})).is_err());
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
