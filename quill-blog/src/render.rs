//! Presentation helpers for page templates.

use chrono::DateTime;
use pulldown_cmark::{html, Options, Parser};
use quill_core::template::escape_html;

/// Render blog Markdown to HTML, with tables and strikethrough enabled.
pub fn markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, options));
    out
}

/// Wrap every non-blank line in `<p>` with HTML special characters escaped.
pub fn text2html(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

/// Relative age of `t` seen from `now`, both in Unix seconds. Anything a week
/// or older is shown as a UTC date.
pub fn datetime_filter(t: f64, now: f64) -> String {
    let delta = (now - t) as i64;
    match delta {
        d if d < 60 => "1 minute ago".to_string(),
        d if d < 3600 => format!("{} minutes ago", d / 60),
        d if d < 86400 => format!("{} hours ago", d / 3600),
        d if d < 604800 => format!("{} days ago", d / 86400),
        _ => DateTime::from_timestamp(t as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_skip_blank_lines_and_escape() {
        assert_eq!(
            text2html("Hello <b>\n\n  \nTom & Jerry"),
            "<p>Hello &lt;b&gt;</p><p>Tom &amp; Jerry</p>"
        );
        assert_eq!(text2html(""), "");
    }

    #[test]
    fn markdown_renders_blocks_and_inline_markup() {
        assert_eq!(
            markdown("# Title\n\nSome *em* and `code`\n\n- one\n- two"),
            "<h1>Title</h1>\n<p>Some <em>em</em> and <code>code</code></p>\n\
             <ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(markdown("~~old~~"), "<p><del>old</del></p>\n");
        assert_eq!(markdown(""), "");
    }

    #[test]
    fn relative_times() {
        let now = 1_700_000_000.0;
        assert_eq!(datetime_filter(now - 5.0, now), "1 minute ago");
        assert_eq!(datetime_filter(now - 150.0, now), "2 minutes ago");
        assert_eq!(datetime_filter(now - 7200.0, now), "2 hours ago");
        assert_eq!(datetime_filter(now - 3.0 * 86400.0, now), "3 days ago");
        assert_eq!(datetime_filter(0.0, now), "1970-01-01");
    }
}
