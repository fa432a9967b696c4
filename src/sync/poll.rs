//! Incremental polling from a caller-held resume cursor.

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::client::ActivitySource;
use crate::api::types::{Activity, ResumeCursor, SessionName};
use crate::error::Result;
use crate::sync::filter::ActivityFilter;
use crate::sync::paginate::WALK_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOutcome {
    /// New activities that pass the filter.
    pub activities: Vec<Activity>,
    /// Cursor to pass to the next poll.
    #[serde(flatten)]
    pub cursor: ResumeCursor,
}

/// Two-phase scan over the walked activities.
#[derive(Debug)]
enum ScanState {
    /// Skipping up to and including `boundary`; skipped items are kept in
    /// case the boundary never shows up.
    Seeking {
        boundary: String,
        passed: Vec<Activity>,
    },
    Collecting,
}

impl ScanState {
    fn starting_at(last_id: Option<&str>) -> Self {
        match last_id {
            Some(boundary) => Self::Seeking {
                boundary: boundary.to_string(),
                passed: Vec::new(),
            },
            None => Self::Collecting,
        }
    }

    fn observe(&mut self, activity: Activity, fresh: &mut Vec<Activity>) {
        match self {
            Self::Collecting => fresh.push(activity),
            Self::Seeking { boundary, .. } if activity.id == *boundary => {
                *self = Self::Collecting;
            }
            Self::Seeking { passed, .. } => passed.push(activity),
        }
    }
}

/// Return activities appended after `cursor`, and the cursor to resume from.
///
/// The walk starts at `cursor.last_token` and runs to the end of the stream.
/// Activities up to and including `cursor.last_id` are skipped. The filter
/// is applied only to the result: the returned cursor advances past every
/// walked activity, matching or not, so chained polls never rescan.
///
/// If `last_id` never appears (for example after server-side history
/// truncation), every walked activity is treated as new.
pub fn poll(
    source: &impl ActivitySource,
    session: &SessionName,
    cursor: &ResumeCursor,
    filter: &ActivityFilter,
) -> Result<PollOutcome> {
    let mut state = ScanState::starting_at(cursor.last_id.as_deref());
    let mut fresh = Vec::new();
    let mut token = cursor.last_token.clone();
    let mut last_token = cursor.last_token.clone();

    loop {
        let page = source.fetch_page(session, token.as_deref(), WALK_PAGE_SIZE)?;
        let next = page.next_token().map(str::to_string);
        for activity in page.activities {
            state.observe(activity, &mut fresh);
        }
        match next {
            Some(next) => {
                last_token = Some(next.clone());
                token = Some(next);
            }
            None => break,
        }
    }

    if let ScanState::Seeking { boundary, passed } = state {
        warn!(
            session = %session,
            last_id = %boundary,
            walked = passed.len(),
            "resume id not found; treating walked activities as new"
        );
        fresh = passed;
    }

    let next_cursor = ResumeCursor {
        last_id: fresh
            .last()
            .map(|activity| activity.id.clone())
            .or_else(|| cursor.last_id.clone()),
        last_token,
    };
    let walked = fresh.len();
    let activities = filter.apply(fresh);
    debug!(
        session = %session,
        walked,
        matched = activities.len(),
        "poll complete"
    );

    Ok(PollOutcome {
        activities,
        cursor: next_cursor,
    })
}
