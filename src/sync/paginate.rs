//! Forward-only pagination with optional filtering.

use serde::Serialize;
use tracing::debug;

use crate::api::client::ActivitySource;
use crate::api::types::{Activity, SessionName};
use crate::error::Result;
use crate::sync::filter::ActivityFilter;

/// Page size for full walks and filtered scans.
pub const WALK_PAGE_SIZE: u32 = 100;

/// A bounded window of filtered activities plus where to resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredPage {
    pub activities: Vec<Activity>,
    #[serde(rename = "nextPageToken")]
    pub next_token: Option<String>,
}

/// Collect up to `desired_count` activities matching `filter`, starting at
/// `start_token`.
///
/// Without an active filter a single page of `desired_count` is fetched.
/// With one, pages of [`WALK_PAGE_SIZE`] are fetched until enough matches
/// are collected or the stream ends. Excess matches from the last page are
/// dropped; `next_token` is the last token the server returned.
pub fn fetch_filtered(
    source: &impl ActivitySource,
    session: &SessionName,
    filter: &ActivityFilter,
    desired_count: usize,
    start_token: Option<&str>,
) -> Result<FilteredPage> {
    let page_size = if filter.is_active() {
        WALK_PAGE_SIZE
    } else {
        u32::try_from(desired_count).unwrap_or(u32::MAX)
    };

    let mut collected = Vec::new();
    let mut token = start_token.map(str::to_string);

    while collected.len() < desired_count {
        let page = source.fetch_page(session, token.as_deref(), page_size)?;
        let next = page.next_token().map(str::to_string);
        collected.extend(filter.apply(page.activities));
        token = next;
        if token.is_none() || !filter.is_active() {
            break;
        }
    }

    collected.truncate(desired_count);
    debug!(
        session = %session,
        collected = collected.len(),
        desired_count,
        "filtered fetch complete"
    );
    Ok(FilteredPage {
        activities: collected,
        next_token: token,
    })
}

/// Walk the whole stream and return every activity matching `filter`.
pub fn fetch_all(
    source: &impl ActivitySource,
    session: &SessionName,
    filter: &ActivityFilter,
) -> Result<Vec<Activity>> {
    let mut collected = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = source.fetch_page(session, token.as_deref(), WALK_PAGE_SIZE)?;
        let next = page.next_token().map(str::to_string);
        collected.extend(filter.apply(page.activities));
        match next {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(collected)
}
