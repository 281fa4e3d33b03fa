//! Static timeline page rendering.
//!
//! Records become items, consecutive items sharing a date are wrapped in a
//! group, and the groups fill the page's `{{main_body}}`. Every substituted
//! value is HTML-escaped; the templates themselves are trusted.

mod template;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use timeline_shared::{SourceLinks, TimelineRecord};

pub use template::{
    DEFAULT_GROUP, DEFAULT_ITEM, DEFAULT_PAGE, DEFAULT_SOURCE, Templates, escape_html,
    placeholders, substitute,
};

/// Link used when a record has neither sources nor a reference URL.
const NO_LINK: &str = "#";

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A record joined with its resolved sources, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderItem {
    /// Date as written in the sheet.
    pub date: String,
    pub description: String,
    pub reference_url: Option<String>,
    pub sources: SourceLinks,
    /// Calendar date, when the sheet date parses.
    pub parsed_date: Option<NaiveDate>,
}

impl RenderItem {
    pub fn new(record: &TimelineRecord, sources: Option<&SourceLinks>) -> Self {
        Self {
            date: record.date.clone(),
            description: record.description.clone(),
            reference_url: record.reference_url.clone(),
            sources: sources
                .map(|links| {
                    links
                        .iter()
                        .map(|l| l.trim())
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            parsed_date: record.parsed_date(),
        }
    }

    /// Where the item links to: first source, else the reference URL, else `#`.
    pub fn link(&self) -> &str {
        self.sources
            .first()
            .map(String::as_str)
            .or(self.reference_url.as_deref().filter(|u| !u.trim().is_empty()))
            .unwrap_or(NO_LINK)
    }

    /// Date as shown on the page: `DD-MM-YYYY`.
    pub fn display_date(&self) -> String {
        self.date.trim().replace('/', "-")
    }
}

/// Reorder items newest first.
///
/// Items are reversed and then stably sorted by date, descending, so
/// same-day items end up in reverse sheet order. Items whose date does not
/// parse go last.
pub fn order_newest_first(items: &mut [RenderItem]) {
    items.reverse();
    items.sort_by(|a, b| match (a.parsed_date, b.parsed_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render one item.
pub fn render_item(item: &RenderItem, templates: &Templates) -> String {
    let sources = if item.sources.is_empty() {
        String::new()
    } else {
        let links: String = item
            .sources
            .iter()
            .map(|url| substitute(&templates.source, &[("url", escape_html(url).as_str())]))
            .collect();
        format!("<ul class=\"timeline-sources\">{links}</ul>")
    };

    let date = escape_html(&item.display_date());
    let description = escape_html(&item.description);
    let link = escape_html(item.link());

    substitute(
        &templates.item,
        &[
            ("date", date.as_str()),
            ("description", description.as_str()),
            ("link", link.as_str()),
            ("sources", sources.as_str()),
        ],
    )
}

/// Render the body: items grouped by runs of equal dates, in the given order.
pub fn render_body(items: &[RenderItem], templates: &Templates) -> String {
    let mut body = String::new();

    for group in items.chunk_by(|a, b| a.date.trim() == b.date.trim()) {
        let rendered: String = group.iter().map(|item| render_item(item, templates)).collect();
        let date = escape_html(&group[0].display_date());
        body.push_str(&substitute(
            &templates.group,
            &[("date", date.as_str()), ("items", rendered.as_str())],
        ));
    }

    body
}

/// Render a full page.
#[instrument(skip_all, fields(items = items.len()))]
pub fn render_page(items: &[RenderItem], templates: &Templates) -> String {
    let body = render_body(items, templates);
    debug!(bytes = body.len(), "timeline body rendered");
    substitute(&templates.page, &[("main_body", body.as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(date: &str, text: &str) -> RenderItem {
        RenderItem::new(&TimelineRecord::new(date, text), None)
    }

    fn bare_templates() -> Templates {
        Templates {
            page: "<main>{{main_body}}</main>".into(),
            group: "<g d=\"{{date}}\">{{items}}</g>".into(),
            item: "<i href=\"{{link}}\">{{description}}{{sources}}</i>".into(),
            source: "<s>{{url}}</s>".into(),
        }
    }

    #[test]
    fn link_prefers_sources_then_reference() {
        let record = TimelineRecord::new("01/01/2020", "Event A").with_reference_url("http://ref");
        let sources = vec!["".to_string(), "http://src".to_string()];

        assert_eq!(RenderItem::new(&record, Some(&sources)).link(), "http://src");
        assert_eq!(RenderItem::new(&record, None).link(), "http://ref");
        assert_eq!(item("01/01/2020", "x").link(), "#");
    }

    #[test]
    fn scenario_item_renders_with_source() {
        let record =
            TimelineRecord::new("01/01/2020", "Event A").with_reference_url("http://example.com/x");
        let sources = vec!["http://example.com/x".to_string()];
        let html = render_item(&RenderItem::new(&record, Some(&sources)), &bare_templates());
        assert_eq!(
            html,
            "<i href=\"http://example.com/x\">Event A<ul class=\"timeline-sources\"><s>http://example.com/x</s></ul></i>"
        );
    }

    #[test]
    fn consecutive_same_dates_share_a_group() {
        let items = vec![
            item("15/03/2021", "a"),
            item("15/03/2021", "b"),
            item("02/04/2022", "c"),
            item("15/03/2021", "d"),
        ];
        let body = render_body(&items, &bare_templates());
        assert_eq!(
            body,
            "<g d=\"15-03-2021\"><i href=\"#\">a</i><i href=\"#\">b</i></g>\
             <g d=\"02-04-2022\"><i href=\"#\">c</i></g>\
             <g d=\"15-03-2021\"><i href=\"#\">d</i></g>"
        );
    }

    #[test]
    fn values_are_escaped() {
        let html = render_item(
            &item("01/01/2020", "<script>alert('x')</script>"),
            &bare_templates(),
        );
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn newest_first_ordering() {
        let mut items = vec![
            item("01/01/2020", "first"),
            item("sometime", "undated"),
            item("15/03/2021", "same day 1"),
            item("15/03/2021", "same day 2"),
            item("02/04/2022", "latest"),
        ];
        order_newest_first(&mut items);

        let order: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(order, ["latest", "same day 2", "same day 1", "first", "undated"]);
    }

    #[test]
    fn page_wraps_body() {
        let html = render_page(&[item("01/01/2020", "Event A")], &bare_templates());
        assert_eq!(html, "<main><g d=\"01-01-2020\"><i href=\"#\">Event A</i></g></main>");
    }

    #[test]
    fn default_templates_render_a_full_document() {
        let html = render_page(&[item("01/01/2020", "Event A")], &Templates::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("date-is=\"01-01-2020\""));
        assert!(!html.contains("{{"));
    }
}
