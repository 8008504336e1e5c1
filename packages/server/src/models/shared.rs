use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Offset pagination shared by list endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows to skip. Default: 0.
    pub skip: Option<u64>,
    /// Rows to return, clamped to 1-100. Default: 20.
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Resolved `(offset, limit)`.
    pub fn bounds(&self) -> (u64, u64) {
        (
            self.skip.unwrap_or(0),
            self.limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        )
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
