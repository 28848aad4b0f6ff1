//! Visited-pages tracking for back-link navigation.
//!
//! A bounded stack of recently visited locations. Revisiting a location that
//! is already on the stack truncates everything above it, and designated
//! index locations reset the stack entirely, so the back-link always points
//! one step up the path the user actually took.

use std::collections::BTreeMap;

/// One visited location: an endpoint name plus the arguments that identify
/// the concrete page (ids, query params).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedPage {
    pub endpoint: String,
    pub args: BTreeMap<String, String>,
}

impl VisitedPage {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Session-scoped stack of visited pages.
#[derive(Debug, Clone, Default)]
pub struct VisitedPages {
    entries: Vec<VisitedPage>,
    capacity: usize,
}

const DEFAULT_CAPACITY: usize = 32;

impl VisitedPages {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a visit. If the endpoint is already on the stack, everything
    /// recorded after it is discarded; otherwise the page is pushed, evicting
    /// the oldest entry when the stack is full.
    pub fn record(&mut self, page: VisitedPage) {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|p| p.endpoint == page.endpoint)
        {
            self.entries.truncate(pos + 1);
            self.entries[pos] = page;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(page);
    }

    /// Reset the stack so that `page` is the only entry. Index pages (the
    /// dashboard, entity list views) call this.
    pub fn reset_to(&mut self, page: VisitedPage) {
        self.entries.clear();
        self.entries.push(page);
    }

    /// The page a back-link should point at: the entry one below the top.
    pub fn previous(&self) -> Option<&VisitedPage> {
        let len = self.entries.len();
        if len < 2 {
            return None;
        }
        self.entries.get(len - 2)
    }

    /// Drop the current page and return the new top, for "go back" actions.
    pub fn pop(&mut self) -> Option<&VisitedPage> {
        self.entries.pop();
        self.entries.last()
    }

    pub fn current(&self) -> Option<&VisitedPage> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(endpoint: &str) -> VisitedPage {
        VisitedPage::new(endpoint)
    }

    #[test]
    fn records_pages_in_order() {
        let mut visited = VisitedPages::new();
        visited.record(page("funds"));
        visited.record(page("fund_detail"));
        visited.record(page("round_detail"));
        assert_eq!(visited.len(), 3);
        assert_eq!(visited.previous().map(|p| p.endpoint.as_str()), Some("fund_detail"));
    }

    #[test]
    fn revisiting_truncates_entries_above() {
        let mut visited = VisitedPages::new();
        visited.record(page("funds"));
        visited.record(page("fund_detail"));
        visited.record(page("round_detail"));
        visited.record(page("fund_detail"));
        assert_eq!(visited.len(), 2);
        assert_eq!(visited.current().map(|p| p.endpoint.as_str()), Some("fund_detail"));
        assert_eq!(visited.previous().map(|p| p.endpoint.as_str()), Some("funds"));
    }

    #[test]
    fn revisit_keeps_latest_args() {
        let mut visited = VisitedPages::new();
        visited.record(page("fund_detail").with_arg("fund_id", "a"));
        visited.record(page("round_detail"));
        visited.record(page("fund_detail").with_arg("fund_id", "b"));
        assert_eq!(visited.len(), 1);
        assert_eq!(
            visited.current().and_then(|p| p.args.get("fund_id")).map(String::as_str),
            Some("b")
        );
    }

    #[test]
    fn reset_clears_the_stack() {
        let mut visited = VisitedPages::new();
        visited.record(page("funds"));
        visited.record(page("fund_detail"));
        visited.reset_to(page("dashboard"));
        assert_eq!(visited.len(), 1);
        assert!(visited.previous().is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut visited = VisitedPages::with_capacity(2);
        visited.record(page("a"));
        visited.record(page("b"));
        visited.record(page("c"));
        assert_eq!(visited.len(), 2);
        assert_eq!(visited.previous().map(|p| p.endpoint.as_str()), Some("b"));
    }

    #[test]
    fn pop_walks_back() {
        let mut visited = VisitedPages::new();
        visited.record(page("a"));
        visited.record(page("b"));
        assert_eq!(visited.pop().map(|p| p.endpoint.as_str()), Some("a"));
        assert!(visited.pop().is_none());
    }
}
