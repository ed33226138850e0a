//! `Link` header pagination.
//!
//! List endpoints advertise neighbouring pages through a header of the form
//!
//! ```text
//! Link: <https://api.github.com/user/repos?page=3>; rel="next", <https://api.github.com/user/repos?page=50>; rel="last"
//! ```
//!
//! [`Pagination::from_link_header`] extracts the `page` query parameter of each
//! relation into plain page numbers, and [`ListOptions`] goes the other way when a
//! caller asks for a specific page.

use crate::metadata::RequestMetadata;
use url::Url;

/// Page numbers advertised by a response. Zero means "not present".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Page number of the previous page.
    pub prev: u32,
    /// Page number of the next page.
    pub next: u32,
    /// Page number of the first page.
    pub first: u32,
    /// Page number of the last page.
    pub last: u32,
}

/// A `Link` header that could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkHeaderError {
    /// The target of a link is not a valid URL.
    #[error("invalid link URL {url:?}: {source}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// The parse failure.
        source: url::ParseError,
    },

    /// A link's URL carries no usable `page` query parameter.
    #[error("invalid page {value:?} in link {url:?}")]
    InvalidPage {
        /// The URL of the link.
        url: String,
        /// The raw `page` value; empty when the parameter is missing.
        value: String,
    },
}

impl Pagination {
    /// Parses a `Link` header value.
    ///
    /// An empty value yields no pages. Entries that are not `<url>; rel="..."` pairs and
    /// unknown relations are skipped, as are links pointing at page `0`. A later link
    /// with the same relation overwrites an earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error when a link's URL does not parse or its `page` parameter is
    /// missing or not a non-negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use octocall::pagination::Pagination;
    ///
    /// let pages = Pagination::from_link_header(
    ///     r#"<https://api.github.com/users?page=3>; rel="next", <https://api.github.com/users?page=9>; rel="last""#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(pages.next, 3);
    /// assert_eq!(pages.last, 9);
    /// assert_eq!(pages.prev, 0);
    /// ```
    pub fn from_link_header(header: &str) -> Result<Self, LinkHeaderError> {
        let mut pages = Self::default();

        for link in header.split(',') {
            let mut parts = link.split(';');
            let (Some(target), Some(rel), None) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };

            let raw_url = target.trim_matches(|c: char| c == '<' || c == '>' || c == ' ');
            let rel = rel.trim().trim_start_matches("rel=").trim_matches('"');

            let page = page_number(raw_url)?;
            if page == 0 {
                continue;
            }

            match rel {
                "prev" => pages.prev = page,
                "next" => pages.next = page,
                "first" => pages.first = page,
                "last" => pages.last = page,
                _ => {}
            }
        }

        Ok(pages)
    }

    /// Returns `true` if there is a next page to fetch.
    pub fn has_next(&self) -> bool {
        self.next != 0
    }
}

fn page_number(raw_url: &str) -> Result<u32, LinkHeaderError> {
    let url = Url::parse(raw_url).map_err(|source| LinkHeaderError::InvalidUrl {
        url: raw_url.to_string(),
        source,
    })?;

    let value = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    value.parse().map_err(|_| LinkHeaderError::InvalidPage {
        url: raw_url.to_string(),
        value,
    })
}

/// Page selection shared by every list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to fetch (1-based). `None` lets the server pick the first page.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListOptions {
    /// Selects a page.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }

    /// Sets the page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Appends `page` and `per_page` query parameters when they are set.
    pub fn apply(&self, mut metadata: RequestMetadata) -> RequestMetadata {
        if let Some(page) = self.page.filter(|p| *p != 0) {
            metadata = metadata.with_query_param("page", page.to_string());
        }
        if let Some(per_page) = self.per_page.filter(|p| *p != 0) {
            metadata = metadata.with_query_param("per_page", per_page.to_string());
        }
        metadata
    }
}
