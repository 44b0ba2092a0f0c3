use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    Asc,
    Desc,
}

impl SortType {
    /// `asc` or `desc`; anything else yields `fallback`.
    pub fn parse_or(value: Option<&str>, fallback: SortType) -> Self {
        match value {
            Some("asc") => Self::Asc,
            Some("desc") => Self::Desc,
            _ => fallback,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Lenient parsing: missing, non-numeric or non-positive values take the
    /// defaults, and `limit` is capped at `max_limit`.
    pub fn parse(page: Option<&str>, limit: Option<&str>, max_limit: u32) -> Self {
        let positive = |v: Option<&str>| {
            v.and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n > 0)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit)
                .unwrap_or(DEFAULT_LIMIT)
                .min(max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page.saturating_sub(1))
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.limit.max(1)))
    }

    /// The slice of an already filtered and ordered sequence this page covers.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect()
    }
}

/// One page of rows plus the number of rows matching the filter overall.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_items: u64,
}

/// `%needle%` with `LIKE` metacharacters escaped (escape character `\`).
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
