// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

pub const DEFAULT_EDGE_COUNT: u32 = 1;
pub const DEFAULT_WINDOW_RADIUS: u32 = 1;

/// One entry in a pager: a page number or a non-interactive gap marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageToken {
    Page(u32),
    Ellipsis,
}

impl PageToken {
    pub const fn page(self) -> Option<u32> {
        match self {
            Self::Page(page) => Some(page),
            Self::Ellipsis => None,
        }
    }

    pub const fn is_ellipsis(self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{page}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Pager tokens with the default edge count and window radius.
pub fn pagination_window(current: u32, total_pages: u32) -> Vec<PageToken> {
    compute_pagination_window(
        current,
        total_pages,
        DEFAULT_EDGE_COUNT,
        DEFAULT_WINDOW_RADIUS,
    )
}

/// Computes the pager tokens for `current` out of `total_pages`.
///
/// Small collections list every page. Larger ones keep `edge_count` pages at
/// each end and `window_radius` pages either side of `current`, with an
/// ellipsis wherever pages are skipped.
pub fn compute_pagination_window(
    current: u32,
    total_pages: u32,
    edge_count: u32,
    window_radius: u32,
) -> Vec<PageToken> {
    if total_pages == 0 {
        return Vec::new();
    }

    let edge = edge_count.max(1);
    let threshold = edge
        .saturating_mul(2)
        .saturating_add(window_radius.saturating_mul(2))
        .saturating_add(2);
    if total_pages <= threshold {
        return (1..=total_pages).map(PageToken::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let window_start = current.saturating_sub(window_radius).max(edge + 1);
    let window_end = current
        .saturating_add(window_radius)
        .min(total_pages - edge);

    let mut tokens: Vec<PageToken> = (1..=edge).map(PageToken::Page).collect();
    if window_start > edge + 1 {
        tokens.push(PageToken::Ellipsis);
    }
    tokens.extend((window_start..=window_end).map(PageToken::Page));
    if window_end < total_pages - edge {
        tokens.push(PageToken::Ellipsis);
    }
    tokens.extend((total_pages - edge + 1..=total_pages).map(PageToken::Page));
    tokens
}
