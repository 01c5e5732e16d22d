//! List requests and canonical list responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default page size used by most list screens.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl core::str::FromStr for SortOrder {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(crate::DomainError::validation(format!(
                "sort order must be asc or desc, got '{other}'"
            ))),
        }
    }
}

/// Parameters of a paginated, filtered list request.
///
/// Values are immutable once built: every `with_*` call returns a new request,
/// so a `ListParams` can double as (part of) a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListParams {
    page: u32,
    limit: u32,
    search: String,
    filters: BTreeMap<String, String>,
    sort_by: Option<String>,
    sort_order: Option<SortOrder>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl ListParams {
    /// Page and limit are clamped to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: String::new(),
            filters: BTreeMap::new(),
            sort_by: None,
            sort_order: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set a named filter (`status`, `category`, ...). An empty value clears it.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.filters.remove(&name);
        } else {
            self.filters.insert(name, value);
        }
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        let sort_by = sort_by.into();
        if sort_by.trim().is_empty() {
            self.sort_by = None;
            self.sort_order = None;
        } else {
            self.sort_by = Some(sort_by);
            self.sort_order = Some(order);
        }
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    /// Query-string pairs for the request.
    ///
    /// `page` and `limit` are always present. Search, filters and sorting are
    /// omitted when empty: several endpoints treat `status=` as an active
    /// filter that matches nothing.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];

        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search".to_string(), search.to_string()));
        }

        for (name, value) in &self.filters {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((name.clone(), value.to_string()));
            }
        }

        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
            if let Some(order) = self.sort_order {
                pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
            }
        }

        pairs
    }

    /// Deterministic string form of the request, used in cache keys.
    pub fn cache_fingerprint(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Number of pages needed for `total` items at `page_size` per page.
///
/// A `page_size` of 0 is treated as 1.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total.div_ceil(size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Canonical paginated collection, whatever envelope the server used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> ListEnvelope<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32, total_pages: u32) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    /// Build an envelope, deriving `total_pages` from `total` and `page_size`.
    pub fn from_counts(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            items,
            total,
            page: page.max(1),
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::from_counts(Vec::new(), 0, page, page_size)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListEnvelope<U> {
        ListEnvelope {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_not_sent() {
        let params = ListParams::new(2, 10)
            .with_search("   ")
            .with_filter("status", "")
            .with_filter("category", "tools");

        let pairs = params.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("category".to_string(), "tools".to_string()),
            ]
        );
    }

    #[test]
    fn clearing_a_filter_removes_it() {
        let params = ListParams::default()
            .with_filter("status", "active")
            .with_filter("status", "");
        assert_eq!(params.filter("status"), None);
        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn sort_is_sent_in_camel_case() {
        let params = ListParams::default().with_sort("createdAt", SortOrder::Desc);
        assert_eq!(params.cache_fingerprint(), "page=1&limit=10&sortBy=createdAt&sortOrder=desc");
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let params = ListParams::new(0, 0);
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn fingerprint_distinguishes_pages() {
        let a = ListParams::new(1, 10).with_search("bolt");
        let b = a.clone().with_page(2);
        assert_ne!(a.cache_fingerprint(), b.cache_fingerprint());
    }

    #[test]
    fn twenty_five_items_at_ten_per_page_is_three_pages() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn from_counts_derives_total_pages() {
        let envelope = ListEnvelope::from_counts((0..10).collect::<Vec<_>>(), 25, 2, 10);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.len(), 10);
        assert!(envelope.has_next_page());

        let doubled = envelope.map(|n| n * 2);
        assert_eq!(doubled.items[1], 2);
        assert_eq!(doubled.total, 25);
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// total_pages is the ceiling of total / page_size.
            #[test]
            fn total_pages_is_ceiling(total in 0u64..1_000_000, page_size in 1u32..500) {
                let pages = u64::from(total_pages(total, page_size));
                let size = u64::from(page_size);
                prop_assert!(pages * size >= total);
                if total > 0 {
                    prop_assert!((pages - 1) * size < total);
                } else {
                    prop_assert_eq!(pages, 0);
                }
            }

            /// More than one page exists exactly when total exceeds the page size.
            #[test]
            fn multiple_pages_iff_total_exceeds_page_size(total in 0u64..100_000, page_size in 1u32..500) {
                let pages = total_pages(total, page_size);
                prop_assert_eq!(pages > 1, total > u64::from(page_size));
            }
        }
    }
}
