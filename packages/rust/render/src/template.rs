//! Named-placeholder templates.
//!
//! A placeholder is `{{name}}`. Substitution is a single pass over the
//! template, so values that happen to contain `{{...}}` are never expanded.
//! Placeholders with no value are left untouched.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use timeline_shared::{Result, TimelineError};

/// Matches `{{name}}`, tolerating inner whitespace.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex")
});

pub const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Timeline</title>
</head>
<body>
    <div class="timeline">
{{main_body}}
    </div>
</body>
</html>
"#;

pub const DEFAULT_GROUP: &str = r#"
    <section class="timeline-group" data-date="{{date}}">
{{items}}
    </section>
"#;

pub const DEFAULT_ITEM: &str = r#"
        <div class="timeline-item" date-is="{{date}}">
            <a href="{{link}}" target="_blank" rel="noopener">
            <p>
                {{description}}
            </p>
            </a>
{{sources}}
        </div>
"#;

pub const DEFAULT_SOURCE: &str = r#"<li><a href="{{url}}" target="_blank" rel="noopener">{{url}}</a></li>"#;

/// The four templates a page is assembled from.
#[derive(Debug, Clone)]
pub struct Templates {
    /// Whole page; receives `{{main_body}}`.
    pub page: String,
    /// One date group; receives `{{date}}` and `{{items}}`.
    pub group: String,
    /// One record; receives `{{date}}`, `{{description}}`, `{{link}}`, `{{sources}}`.
    pub item: String,
    /// One resolved source link; receives `{{url}}`.
    pub source: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE.to_string(),
            group: DEFAULT_GROUP.to_string(),
            item: DEFAULT_ITEM.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl Templates {
    /// Built-in templates, with the page template read from `page` if given.
    pub fn load(page: Option<&Path>) -> Result<Self> {
        let mut templates = Self::default();
        if let Some(path) = page {
            let content = std::fs::read_to_string(path).map_err(|e| TimelineError::io(path, e))?;
            templates.page = content;
        }
        templates.validate()?;
        Ok(templates)
    }

    /// The page template must have somewhere to put the body.
    pub fn validate(&self) -> Result<()> {
        if !placeholders(&self.page).any(|name| name == "main_body") {
            return Err(TimelineError::validation(
                "page template has no {{main_body}} placeholder",
            ));
        }
        Ok(())
    }
}

/// Names of the placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Replace every `{{name}}` whose name appears in `values`.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Escape text for use in HTML element content and quoted attributes.
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

    #[test]
    fn substitute_replaces_known_names() {
        let out = substitute(
            "<p data-d='{{date}}'>{{ description }}</p>",
            &[("date", "01-01-2020"), ("description", "Event A")],
        );
        assert_eq!(out, "<p data-d='01-01-2020'>Event A</p>");
    }

    #[test]
    fn substitute_leaves_unknown_placeholders() {
        let out = substitute("{{date}} {{unknown}}", &[("date", "x")]);
        assert_eq!(out, "x {{unknown}}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = substitute(
            "{{description}} {{link}}",
            &[("description", "literal {{link}}"), ("link", "http://x")],
        );
        assert_eq!(out, "literal {{link}} http://x");
    }

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Κυβέρνηση"), "Κυβέρνηση");
    }

    #[test]
    fn default_templates_are_valid() {
        assert!(Templates::default().validate().is_ok());
    }

    #[test]
    fn page_template_loads_from_file() {
        let templates =
            Templates::load(Some(Path::new("../../../fixtures/templates/page.html"))).unwrap();
        assert!(templates.page.contains("Fixture timeline"));
    }

    #[test]
    fn page_without_body_placeholder_is_rejected() {
        let templates = Templates {
            page: "<html></html>".into(),
            ..Templates::default()
        };
        assert!(matches!(
            templates.validate(),
            Err(TimelineError::Validation { .. })
        ));
    }
}
