//! In-memory activity log serving pages the way the sessions API does.
//!
//! Page tokens are stringified offsets. Appends may be scheduled to land
//! after a given number of page requests, which lets tests model a log that
//! grows while a caller is walking or polling it.

use parking_lot::Mutex;

use crate::api::client::ActivitySource;
use crate::api::types::{Activity, Originator, Page, SessionName};
use crate::error::{JulesError, Result};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub session: String,
    pub token: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Default)]
struct LogState {
    activities: Vec<Activity>,
    requests: Vec<PageRequest>,
    scheduled: Vec<(usize, Activity)>,
    failures: Vec<(usize, u16)>,
}

#[derive(Debug, Default)]
pub struct MemoryLog {
    state: Mutex<LogState>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_activities(activities: impl IntoIterator<Item = Activity>) -> Self {
        let log = Self::new();
        log.state.lock().activities.extend(activities);
        log
    }

    pub fn append(&self, activity: Activity) {
        self.state.lock().activities.push(activity);
    }

    /// Append `activity` once `after_requests` page requests have been served.
    pub fn append_after(&self, after_requests: usize, activity: Activity) {
        self.state.lock().scheduled.push((after_requests, activity));
    }

    /// Make the request with 1-based index `request` fail with `status`.
    pub fn fail_request(&self, request: usize, status: u16) {
        self.state.lock().failures.push((request, status));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().activities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.state
            .lock()
            .activities
            .iter()
            .map(|activity| activity.id.clone())
            .collect()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<PageRequest> {
        self.state.lock().requests.clone()
    }
}

impl ActivitySource for MemoryLog {
    fn fetch_page(
        &self,
        session: &SessionName,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page> {
        let mut state = self.state.lock();
        state.requests.push(PageRequest {
            session: session.to_string(),
            token: token.map(str::to_string),
            page_size,
        });
        let served = state.requests.len();

        if let Some(&(_, status)) = state.failures.iter().find(|(at, _)| *at == served) {
            return Err(JulesError::Api {
                status,
                body: format!("injected failure on request {served}"),
            });
        }

        let offset = match token {
            Some(token) => token.parse::<usize>().map_err(|_| JulesError::Api {
                status: 400,
                body: format!("invalid page token {token:?}"),
            })?,
            None => 0,
        };
        let size = match usize::try_from(page_size) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(size) => size,
        };
        let len = state.activities.len();
        let start = offset.min(len);
        let end = start.saturating_add(size).min(len);
        let page = Page {
            activities: state.activities[start..end].to_vec(),
            next_page_token: (end < len).then(|| end.to_string()),
        };

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.scheduled)
            .into_iter()
            .partition(|(after, _)| *after <= served);
        state.scheduled = pending;
        state
            .activities
            .extend(due.into_iter().map(|(_, activity)| activity));

        Ok(page)
    }
}

/// Minimal activity with a `kind` payload field.
#[must_use]
pub fn activity(id: &str, originator: Originator, kind: &str) -> Activity {
    let mut extra = serde_json::Map::new();
    extra.insert(kind.to_string(), serde_json::json!({}));
    Activity {
        id: id.to_string(),
        name: Some(format!("sessions/test/activities/{id}")),
        originator: Some(originator),
        create_time: None,
        description: None,
        extra,
    }
}
