//! Page request and response values shared by every paged query.
//!
//! Pages are zero-based. A page past the end of the result set is not an
//! error; it yields no records while still reporting the full match count so
//! clients can compute how many pages exist.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Largest page size the store accepts.
pub const MAX_PER_PAGE: u32 = 500;

/// Page size used when none is requested.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Which slice of a result set to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

/// Unvalidated wire form of [`PageRequest`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageRequest {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = StoreError;

    fn try_from(raw: RawPageRequest) -> StoreResult<Self> {
        Self::new(raw.page, raw.per_page)
    }
}

impl PageRequest {
    /// Create a validated page request.
    ///
    /// `per_page` must be within `1..=MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> StoreResult<Self> {
        if per_page == 0 {
            return Err(StoreError::invalid_page_request("per_page must be positive"));
        }
        if per_page > MAX_PER_PAGE {
            return Err(StoreError::invalid_page_request(format!(
                "per_page {per_page} exceeds the maximum of {MAX_PER_PAGE}"
            )));
        }
        Ok(Self { page, per_page })
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of records per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Half-open record range `[start, end)` for a result set of `total` records.
    ///
    /// Returns `None` when the page starts past the end.
    fn bounds(&self, total: usize) -> Option<(usize, usize)> {
        let per_page = self.per_page as usize;
        let start = (self.page as usize).saturating_mul(per_page);
        let end = start.saturating_add(per_page).min(total);
        (start <= end).then_some((start, end))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of records plus the number of records across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse<T> {
    /// Records on this page, in query order.
    pub records: Vec<T>,
    /// Number of matching records before pagination.
    pub total: usize,
}

impl<T> PageResponse<T> {
    /// Slice `records` according to `request`.
    pub fn create(mut records: Vec<T>, request: &PageRequest) -> Self {
        let total = records.len();
        match request.bounds(total) {
            Some((start, end)) => {
                records.truncate(end);
                records.drain(..start);
                Self { records, total }
            }
            None => Self {
                records: Vec::new(),
                total,
            },
        }
    }

    /// A page with no records and a zero total.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
        }
    }

    /// Returns `true` if this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Project every record, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}
