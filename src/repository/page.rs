//! Paging and sorting requests

use super::{RepositoryError, RepositoryResult};
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(RepositoryError::InvalidSort(format!(
                "unknown sort direction '{}'",
                s
            ))),
        }
    }
}

/// Sort order over one property (`id` or a mapped property key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    pub const ID: &'static str = "id";

    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction)
    }
}

/// Parses `property` or `property,direction`
impl FromStr for Sort {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let property = parts.next().unwrap_or_default().trim();
        if property.is_empty() {
            return Err(RepositoryError::InvalidSort("empty sort property".to_string()));
        }
        let direction = match parts.next() {
            Some(dir) => dir.trim().parse()?,
            None => Direction::Asc,
        };

        Ok(Sort {
            property: property.to_string(),
            direction,
        })
    }
}

/// Zero-based page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
    sort: Option<Sort>,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 20;
    pub const MAX_SIZE: usize = 1000;

    /// Sizes above [`PageRequest::MAX_SIZE`] are clamped; a zero size is rejected.
    pub fn new(page: usize, size: usize) -> RepositoryResult<Self> {
        if size == 0 {
            return Err(RepositoryError::InvalidPageSize);
        }
        Ok(Self {
            page,
            size: size.min(Self::MAX_SIZE),
            sort: None,
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
            sort: None,
        }
    }
}

/// One page of results plus the totals needed for navigation
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut the page described by `request` out of the full, ordered result
    pub fn from_sorted(all: Vec<T>, request: &PageRequest) -> Self {
        let total_elements = all.len();
        let content = all
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();

        Page {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(request.size()),
        }
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }
}
