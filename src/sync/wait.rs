//! Block until a matching activity is appended, or a deadline passes.

use std::time::Duration;

use tracing::{debug, info};

use crate::api::client::ActivitySource;
use crate::api::types::{Activity, SessionName};
use crate::clock::Clock;
use crate::config::WaitConfig;
use crate::error::{JulesError, Result};
use crate::sync::filter::ActivityFilter;
use crate::sync::poll::poll;
use crate::sync::tail::locate_end;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&WaitConfig> for WaitOptions {
    fn from(config: &WaitConfig) -> Self {
        Self {
            timeout: config.timeout,
            poll_interval: config.poll_interval,
        }
    }
}

/// Wait for an activity matching `filter` appended after this call starts.
///
/// The deadline is checked once per iteration, before each poll; a request
/// already in flight is allowed to finish. Returns [`JulesError::Timeout`]
/// when the deadline passes without a match.
pub fn wait_for(
    source: &impl ActivitySource,
    clock: &dyn Clock,
    session: &SessionName,
    filter: &ActivityFilter,
    options: WaitOptions,
) -> Result<Vec<Activity>> {
    let start = clock.now();
    let mut cursor = locate_end(source, session)?;

    info!(
        session = %session,
        originator = ?filter.originator,
        kind = ?filter.kind,
        "Waiting for activity"
    );

    let mut polls = 0u32;
    while clock.now().duration_since(start) < options.timeout {
        let outcome = poll(source, session, &cursor, filter)?;
        polls += 1;
        if !outcome.activities.is_empty() {
            debug!(session = %session, polls, "wait satisfied");
            return Ok(outcome.activities);
        }
        cursor = outcome.cursor;
        clock.sleep(options.poll_interval);
    }

    debug!(session = %session, polls, "wait timed out");
    Err(JulesError::Timeout(options.timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Originator;
    use crate::clock::ManualClock;
    use crate::test_utils::{MemoryLog, activity};

    fn session() -> SessionName {
        SessionName::parse("s1").unwrap()
    }

    fn options(timeout: u64, interval: u64) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(timeout),
            poll_interval: Duration::from_secs(interval),
        }
    }

    #[test]
    fn times_out_when_nothing_matches() {
        let log = MemoryLog::with_activities([activity("A1", Originator::User, "userMessaged")]);
        let clock = ManualClock::new();
        let filter = ActivityFilter::new(Some(Originator::Agent), None);
        let err = wait_for(&log, &clock, &session(), &filter, options(2, 1)).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[test]
    fn ignores_history_and_returns_new_match() {
        let log = MemoryLog::with_activities([
            activity("A1", Originator::Agent, "agentMessaged"),
            activity("A2", Originator::User, "userMessaged"),
        ]);
        // Request 1 is the tail walk; the append lands before the second poll.
        log.append_after(2, activity("A3", Originator::User, "userMessaged"));
        log.append_after(2, activity("A4", Originator::Agent, "agentMessaged"));

        let clock = ManualClock::new();
        let filter = ActivityFilter::new(Some(Originator::Agent), None);
        let got = wait_for(&log, &clock, &session(), &filter, options(60, 5)).unwrap();
        let ids: Vec<_> = got.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["A4"]);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn zero_timeout_never_polls() {
        let log = MemoryLog::new();
        let clock = ManualClock::new();
        let err = wait_for(&log, &clock, &session(), &ActivityFilter::any(), options(0, 1))
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(log.requests().len(), 1);
    }

    #[test]
    fn poll_error_aborts_wait() {
        let log = MemoryLog::new();
        log.fail_request(2, 403);
        let clock = ManualClock::new();
        let err = wait_for(&log, &clock, &session(), &ActivityFilter::any(), options(10, 1))
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
