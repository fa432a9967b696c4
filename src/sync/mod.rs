//! Synchronization over a session's append-only activity log.
//!
//! Everything here is written against [`crate::api::ActivitySource`] and is
//! stateless between calls: resume state travels in a
//! [`crate::api::ResumeCursor`] owned by the caller.

pub mod filter;
pub mod paginate;
pub mod poll;
pub mod tail;
pub mod wait;

pub use filter::ActivityFilter;
pub use paginate::{FilteredPage, WALK_PAGE_SIZE, fetch_all, fetch_filtered};
pub use poll::{PollOutcome, poll};
pub use tail::{TailWindow, latest, locate_end};
pub use wait::{WaitOptions, wait_for};
