//! Standalone HTML rendering of a review artifact.

use crate::domain::entities::ReviewArtifact;
use crate::domain::value_objects::repository_path;
use pulldown_cmark::{html, Event, Options, Parser};
use pulldown_cmark_escape::escape_html;

/// Default `Content-Type` for rendered review documents
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Render Markdown to an HTML fragment.
///
/// Raw HTML in the source is shown as text rather than passed through.
pub fn render_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String cannot fail
    let _ = escape_html(&mut escaped, text);
    escaped
}

/// Wrap the rendered review in a complete HTML page with a metadata header
pub fn render_review_document(artifact: &ReviewArtifact) -> String {
    let repository = escape_text(&repository_path(&artifact.repo_url));
    let base = escape_text(&artifact.base_branch);
    let feature = escape_text(&artifact.feature_branch);
    let generated_at = artifact.generated_at.format("%Y-%m-%d %H:%M:%S UTC");
    let body = render_markdown(&artifact.markdown_body);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Code review: {repository} ({base} &larr; {feature})</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; line-height: 1.5; }}
header {{ border-bottom: 1px solid #d0d7de; margin-bottom: 1.5rem; }}
pre {{ background: #f6f8fa; padding: 1rem; overflow-x: auto; }}
code {{ font-family: ui-monospace, SFMono-Regular, Menlo, monospace; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #d0d7de; padding: 0.25rem 0.75rem; }}
</style>
</head>
<body>
<header>
<h1>Code review: {repository}</h1>
<p><strong>Branch:</strong> {base} &larr; {feature}<br><strong>Generated:</strong> {generated_at}</p>
</header>
<main>
{body}</main>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn artifact(body: &str) -> ReviewArtifact {
        ReviewArtifact {
            repo_url: "git@github.com:example/service.git".to_string(),
            base_branch: "main".to_string(),
            feature_branch: "feature/<login>".to_string(),
            markdown_body: body.to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("# Summary\n\nThis is **bold**.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<h1>Summary</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("before <script>alert(1)</script> after");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_fenced_diff_is_escaped() {
        let html = render_markdown("```diff\n+if a < b && c > d {\n```\n");
        assert!(html.contains("&lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn test_document_header() {
        let document = render_review_document(&artifact("Looks good."));
        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains("<h1>Code review: example/service</h1>"));
        assert!(document.contains("main &larr; feature/&lt;login&gt;"));
        assert!(document.contains("2024-05-01 12:30:00 UTC"));
        assert!(document.contains("<p>Looks good.</p>"));
    }

    #[test]
    fn test_header_fields_are_escaped() {
        let mut review = artifact("ok");
        review.feature_branch = "feature/<script>\"x\"&y".to_string();
        let document = render_review_document(&review);
        assert!(!document.contains("<script>"));
        assert!(document.contains("feature/&lt;script&gt;&quot;x&quot;&amp;y"));
    }
}
