//! Locating the tail of a log that only supports forward pagination.
//!
//! There is no reverse cursor, so both operations here walk the entire
//! stream. Callers that need the tail repeatedly should poll instead.

use std::collections::VecDeque;

use tracing::debug;

use crate::api::client::ActivitySource;
use crate::api::types::{Activity, ResumeCursor, SessionName};
use crate::error::Result;
use crate::sync::filter::ActivityFilter;
use crate::sync::paginate::WALK_PAGE_SIZE;

/// Fixed-capacity window keeping the most recent pushes.
#[derive(Debug, Clone)]
pub struct TailWindow {
    capacity: usize,
    items: VecDeque<Activity>,
}

impl TailWindow {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity.min(WALK_PAGE_SIZE as usize)),
        }
    }

    pub fn push(&mut self, activity: Activity) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(activity);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Activity> {
        self.items.into()
    }
}

/// The last `count` activities matching `filter`, oldest first.
pub fn latest(
    source: &impl ActivitySource,
    session: &SessionName,
    filter: &ActivityFilter,
    count: usize,
) -> Result<Vec<Activity>> {
    let mut window = TailWindow::new(count);
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.fetch_page(session, token.as_deref(), WALK_PAGE_SIZE)?;
        pages += 1;
        let next = page.next_token().map(str::to_string);
        for activity in page.activities {
            if filter.matches(&activity) {
                window.push(activity);
            }
        }
        match next {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(session = %session, pages, kept = window.len(), "tail walk complete");
    Ok(window.into_vec())
}

/// Walk to the end of the stream and return a cursor positioned after the
/// last activity: its id plus the last continuation token observed.
pub fn locate_end(source: &impl ActivitySource, session: &SessionName) -> Result<ResumeCursor> {
    let mut cursor = ResumeCursor::default();
    let mut token: Option<String> = None;

    loop {
        let page = source.fetch_page(session, token.as_deref(), WALK_PAGE_SIZE)?;
        if let Some(last) = page.activities.last() {
            cursor.last_id = Some(last.id.clone());
        }
        match page.next_token() {
            Some(next) => {
                cursor.last_token = Some(next.to_string());
                token = Some(next.to_string());
            }
            None => break,
        }
    }

    Ok(cursor)
}
