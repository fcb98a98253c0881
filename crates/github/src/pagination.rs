//! Page-by-page iteration helpers for list endpoints.
//!
//! List operations fetch exactly one page per call; the client never
//! aggregates pages behind the caller's back, so a failure is always
//! attributable to a single page. Callers drive the page number themselves,
//! usually with a [`PageCursor`]:
//!
//! ```no_run
//! use relnote_github::{PageCursor, RepoApiClient};
//!
//! # async fn example(client: &RepoApiClient) -> relnote_github::Result<()> {
//! let mut cursor = PageCursor::new();
//! let mut all = Vec::new();
//! while let Some(page) = cursor.next_page() {
//!     let issues = client
//!         .list_closed_issues("rust-lang", "rust", "changelog", page)
//!         .await?;
//!     cursor.advance(issues.len());
//!     all.extend(issues);
//! }
//! # Ok(())
//! # }
//! ```

use crate::http::HttpResponse;

/// Page size requested from every list endpoint.
pub const PER_PAGE: usize = 100;

/// Returns `true` if a page with `len` items is the last one.
///
/// A short (or empty) page always ends the sequence.
#[must_use]
pub fn is_last_page(len: usize) -> bool {
    len < PER_PAGE
}

/// Caller-side state for walking a list endpoint one page at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    next: u32,
    done: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    /// Starts at page 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Starts at `page` (1-based; 0 is treated as 1).
    #[must_use]
    pub fn starting_at(page: u32) -> Self {
        Self {
            next: page.max(1),
            done: false,
        }
    }

    /// The page to fetch next, or `None` once the sequence has ended.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        (!self.done).then_some(self.next)
    }

    /// Records that the current page returned `len` items.
    pub fn advance(&mut self, len: usize) {
        if self.done {
            return;
        }
        if is_last_page(len) {
            self.done = true;
        } else {
            self.next = self.next.saturating_add(1);
        }
    }

    /// Returns `true` once a short page has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Page numbers advertised by the `Link` response header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<u32>,
    pub prev: Option<u32>,
    pub first: Option<u32>,
    pub last: Option<u32>,
}

impl PageLinks {
    /// Parses a `Link` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_github::PageLinks;
    ///
    /// let links = PageLinks::parse(
    ///     r#"<https://api.github.com/repositories/1/issues?page=2>; rel="next", <https://api.github.com/repositories/1/issues?page=5>; rel="last""#,
    /// );
    /// assert_eq!(links.next, Some(2));
    /// assert_eq!(links.last, Some(5));
    /// ```
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();
        for part in header.split(',') {
            let mut segments = part.split(';');
            let Some(target) = segments.next() else {
                continue;
            };
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            let Some(page) = page_param(target) else {
                continue;
            };
            for param in segments {
                let Some((key, value)) = param.trim().split_once('=') else {
                    continue;
                };
                if key.trim() != "rel" {
                    continue;
                }
                for rel in value.trim().trim_matches('"').split_whitespace() {
                    match rel {
                        "next" => links.next = Some(page),
                        "prev" => links.prev = Some(page),
                        "first" => links.first = Some(page),
                        "last" => links.last = Some(page),
                        _ => {}
                    }
                }
            }
        }
        links
    }

    /// Reads the links from a response, if it has a `Link` header.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        response.header("link").map(Self::parse).unwrap_or_default()
    }

    /// Returns `true` if the server advertises a further page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

fn page_param(url: &str) -> Option<u32> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

/// One page of a list endpoint together with its `Link` navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub links: PageLinks,
}

impl<T> Page<T> {
    /// Returns `true` if this is the final page.
    ///
    /// Prefers the server's `Link` header; falls back to the short-page rule
    /// when the header is absent.
    #[must_use]
    pub fn is_last(&self) -> bool {
        if self.links != PageLinks::default() {
            return !self.links.has_next();
        }
        is_last_page(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_pages_are_last() {
        assert!(is_last_page(0));
        assert!(is_last_page(PER_PAGE - 1));
        assert!(!is_last_page(PER_PAGE));
    }

    #[test]
    fn cursor_walks_until_short_page() {
        let mut cursor = PageCursor::new();
        assert_eq!(cursor.next_page(), Some(1));

        cursor.advance(PER_PAGE);
        assert_eq!(cursor.next_page(), Some(2));

        cursor.advance(PER_PAGE);
        assert_eq!(cursor.next_page(), Some(3));

        cursor.advance(12);
        assert!(cursor.is_done());
        assert_eq!(cursor.next_page(), None);

        // Further advances are ignored
        cursor.advance(PER_PAGE);
        assert_eq!(cursor.next_page(), None);
    }

    #[test]
    fn cursor_stops_on_empty_first_page() {
        let mut cursor = PageCursor::default();
        cursor.advance(0);
        assert_eq!(cursor.next_page(), None);
    }

    #[test]
    fn cursor_starting_at_zero_is_page_one() {
        assert_eq!(PageCursor::starting_at(0).next_page(), Some(1));
        assert_eq!(PageCursor::starting_at(4).next_page(), Some(4));
    }

    #[test]
    fn link_header_parsing() {
        let header = concat!(
            r#"<https://api.github.com/repos/o/r/issues?state=closed&page=1>; rel="prev", "#,
            r#"<https://api.github.com/repos/o/r/issues?state=closed&page=3>; rel="next", "#,
            r#"<https://api.github.com/repos/o/r/issues?state=closed&page=9>; rel="last", "#,
            r#"<https://api.github.com/repos/o/r/issues?state=closed&page=1>; rel="first""#
        );
        let links = PageLinks::parse(header);

        assert_eq!(links.prev, Some(1));
        assert_eq!(links.next, Some(3));
        assert_eq!(links.last, Some(9));
        assert_eq!(links.first, Some(1));
        assert!(links.has_next());
    }

    #[test]
    fn link_header_garbage_is_ignored() {
        assert_eq!(PageLinks::parse(""), PageLinks::default());
        assert_eq!(PageLinks::parse("nonsense; rel=next"), PageLinks::default());
        assert_eq!(
            PageLinks::parse(r#"<https://x.test/a?per_page=100>; rel="next""#),
            PageLinks::default()
        );
    }

    #[test]
    fn page_is_last_prefers_links() {
        let full_without_next = Page {
            items: vec![0; PER_PAGE],
            links: PageLinks {
                prev: Some(1),
                ..PageLinks::default()
            },
        };
        assert!(full_without_next.is_last());

        let full_without_links = Page {
            items: vec![0; PER_PAGE],
            links: PageLinks::default(),
        };
        assert!(!full_without_links.is_last());

        let short = Page {
            items: vec![0; 3],
            links: PageLinks::default(),
        };
        assert!(short.is_last());
    }

    proptest! {
        #[test]
        fn only_short_pages_are_last(len in 0usize..=3 * PER_PAGE) {
            prop_assert_eq!(is_last_page(len), len < PER_PAGE);
        }

        /// The cursor asks for consecutive pages and stops right after the
        /// first short one.
        #[test]
        fn cursor_stops_after_first_short_page(
            start in 0u32..1000,
            lens in prop::collection::vec(
                prop_oneof![Just(PER_PAGE), 0usize..PER_PAGE],
                1..20,
            ),
        ) {
            let mut cursor = PageCursor::starting_at(start);
            let mut requested = Vec::new();
            for len in &lens {
                let Some(page) = cursor.next_page() else {
                    break;
                };
                requested.push(page);
                cursor.advance(*len);
            }

            let full = lens.iter().take_while(|len| **len == PER_PAGE).count();
            prop_assert_eq!(requested.len(), (full + 1).min(lens.len()));
            for (offset, page) in (0u32..).zip(&requested) {
                prop_assert_eq!(*page, start.max(1) + offset);
            }
            prop_assert_eq!(cursor.is_done(), full < lens.len());
        }
    }
}
