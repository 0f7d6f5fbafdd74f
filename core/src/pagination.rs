//! Page envelopes and page request parameters.
//!
//! # Design
//! The API uses two envelope shapes. Most list endpoints return
//! `{data, meta: {page_number, page_size, total_pages, total_results}}` and
//! accept `page[number]`/`page[size]`. A few return cursor metadata and
//! accept `page[after]`/`page[before]`. Both implement `Paginated`, which
//! tells an iterator which query parameter to set to fetch the next page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `page[number]` / `page[size]` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl PageParams {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: Some(number),
            size: Some(size),
        }
    }
}

/// `page[limit]` / `page[after]` / `page[before]` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_results: u32,
}

/// Offset-paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PaginationMeta>,
}

impl<T> Page<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_page_number().is_some()
    }

    pub fn next_page_number(&self) -> Option<u32> {
        let meta = self.meta.as_ref()?;
        if self.data.is_empty() || meta.page_number >= meta.total_pages {
            return None;
        }
        Some(meta.page_number + 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorMeta {
    #[serde(default)]
    pub cursors: Option<Cursors>,
    /// Relative URL of the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// Cursor-paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<CursorMeta>,
}

impl<T> CursorPage<T> {
    pub fn next_cursor(&self) -> Option<&str> {
        if self.data.is_empty() {
            return None;
        }
        let meta = self.meta.as_ref()?;
        meta.next.as_ref()?;
        meta.cursors.as_ref()?.after.as_deref()
    }
}

/// A page envelope that knows how to request its successor.
pub trait Paginated: DeserializeOwned {
    type Item;

    /// Query parameter to set on the original request to fetch the next
    /// page, or `None` on the last page.
    fn next_page_param(&self) -> Option<(&'static str, String)>;

    /// Parameters of the original request that conflict with the next page
    /// parameter and are dropped when following it.
    const STALE_PARAMS: &'static [&'static str] = &[];

    fn into_items(self) -> Vec<Self::Item>;
}

impl<T: DeserializeOwned> Paginated for Page<T> {
    type Item = T;

    fn next_page_param(&self) -> Option<(&'static str, String)> {
        self.next_page_number()
            .map(|number| ("page[number]", number.to_string()))
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}

impl<T: DeserializeOwned> Paginated for CursorPage<T> {
    type Item = T;

    const STALE_PARAMS: &'static [&'static str] = &["page[before]"];

    fn next_page_param(&self) -> Option<(&'static str, String)> {
        self.next_cursor()
            .map(|cursor| ("page[after]", cursor.to_string()))
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}
