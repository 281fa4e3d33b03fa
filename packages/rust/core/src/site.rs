//! Site rendering: timeline + resolved sources → static HTML pages.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use timeline_render::{RenderItem, Templates, order_newest_first, render_page};
use timeline_shared::{Result, SourceLinks, TimelineRecord};
use timeline_storage::{RecordStore, write_atomic};

/// Page in sheet order.
pub const INDEX_PAGE: &str = "index.html";
/// Page with the newest events first.
pub const REVERSED_PAGE: &str = "index-reversed.html";

/// What a render run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSummary {
    /// Records rendered per page.
    pub items: usize,
    /// Records that had resolved sources in the store.
    pub with_sources: usize,
    /// Files written.
    pub pages: Vec<PathBuf>,
}

/// Render `records` into `out_dir`.
///
/// Sources are looked up by entry id, so a translated sheet (which carries
/// the original ids) picks up the same sources as the original.
#[instrument(skip_all, fields(records = records.len(), out_dir = %out_dir.display()))]
pub fn render_site(
    records: &[TimelineRecord],
    sources: Option<&RecordStore<SourceLinks>>,
    templates: &Templates,
    out_dir: &Path,
    reversed: bool,
) -> Result<SiteSummary> {
    let mut items: Vec<RenderItem> = records
        .iter()
        .filter(|r| !r.is_blank())
        .map(|r| RenderItem::new(r, sources.and_then(|s| s.get(&r.join_id()))))
        .collect();

    let mut summary = SiteSummary {
        items: items.len(),
        with_sources: items.iter().filter(|i| !i.sources.is_empty()).count(),
        pages: Vec::new(),
    };

    let index = out_dir.join(INDEX_PAGE);
    write_atomic(&index, render_page(&items, templates).as_bytes())?;
    summary.pages.push(index);

    if reversed {
        order_newest_first(&mut items);
        let path = out_dir.join(REVERSED_PAGE);
        write_atomic(&path, render_page(&items, templates).as_bytes())?;
        summary.pages.push(path);
    }

    info!(
        items = summary.items,
        with_sources = summary.with_sources,
        pages = summary.pages.len(),
        "site rendered"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_shared::identify;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("timeline-site-test-{}", uuid::Uuid::now_v7()))
    }

    fn records() -> Vec<TimelineRecord> {
        vec![
            TimelineRecord::new("01/01/2020", "Event A")
                .with_reference_url("http://example.com/x"),
            TimelineRecord::new("02/04/2022", "Later event"),
        ]
    }

    #[test]
    fn writes_both_pages_with_sources() {
        let dir = temp_dir();
        let mut store: RecordStore<SourceLinks> =
            RecordStore::load(dir.join("sources.json")).unwrap();
        store
            .put(identify("01/01/2020", "Event A"), vec!["https://source.example/a".into()])
            .unwrap();

        let out = dir.join("site");
        let summary =
            render_site(&records(), Some(&store), &Templates::default(), &out, true).unwrap();

        assert_eq!(summary.items, 2);
        assert_eq!(summary.with_sources, 1);
        assert_eq!(summary.pages, vec![out.join(INDEX_PAGE), out.join(REVERSED_PAGE)]);

        let index = std::fs::read_to_string(out.join(INDEX_PAGE)).unwrap();
        assert!(index.contains("href=\"https://source.example/a\""));
        assert!(index.find("Event A").unwrap() < index.find("Later event").unwrap());

        let reversed = std::fs::read_to_string(out.join(REVERSED_PAGE)).unwrap();
        assert!(reversed.find("Later event").unwrap() < reversed.find("Event A").unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reversed_page_is_optional() {
        let dir = temp_dir();
        let summary = render_site(&records(), None, &Templates::default(), &dir, false).unwrap();

        assert_eq!(summary.pages, vec![dir.join(INDEX_PAGE)]);
        assert!(!dir.join(REVERSED_PAGE).exists());
        let index = std::fs::read_to_string(dir.join(INDEX_PAGE)).unwrap();
        // No sources: falls back to the reference URL, then `#`
        assert!(index.contains("href=\"http://example.com/x\""));
        assert!(index.contains("href=\"#\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn translated_rows_join_on_carried_id() {
        let dir = temp_dir();
        let mut store: RecordStore<SourceLinks> =
            RecordStore::load(dir.join("sources.json")).unwrap();
        let original = identify("01/01/2020", "Γεγονός Α");
        store
            .put(original.clone(), vec!["https://source.example/a".into()])
            .unwrap();

        let mut translated = TimelineRecord::new("01/01/2020", "Event A");
        translated.entry_id = Some(original);

        let summary =
            render_site(&[translated], Some(&store), &Templates::default(), &dir, false).unwrap();
        assert_eq!(summary.with_sources, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
