//! Response envelopes wrapping every API payload

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Standard `{ message, status, data }` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Envelope for an empty response body
    pub const fn empty() -> Self {
        Self {
            message: None,
            status: None,
            data: None,
        }
    }

    /// Take the payload, failing when the backend omitted it
    pub fn into_data(self) -> CoreResult<T> {
        self.data.ok_or(CoreError::MissingData)
    }
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pagination block of list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Paginated list `{ data: T[], pagination }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
