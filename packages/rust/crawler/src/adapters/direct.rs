//! Direct (fallback) adapter.
//!
//! Always matches. The reference URL is itself the source.

use url::Url;

use timeline_shared::SourceLinks;

use super::SourceAdapter;

pub struct DirectAdapter;

impl SourceAdapter for DirectAdapter {
    fn detect(&self, _url: &Url) -> bool {
        true
    }

    fn needs_page(&self) -> bool {
        false
    }

    fn extract(&self, reference: &str, _page: Option<&str>) -> SourceLinks {
        vec![reference.to_string()]
    }

    fn name(&self) -> &str {
        "direct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_the_only_link() {
        let links = DirectAdapter.extract("http://example.com/x", None);
        assert_eq!(links, vec!["http://example.com/x".to_string()]);
    }
}
