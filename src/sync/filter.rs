//! Activity predicate over originator and payload kind.

use serde::{Deserialize, Serialize};

use crate::api::types::{Activity, Originator};

/// Matches an activity when every set dimension matches; unset dimensions
/// match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<Originator>,
    /// Payload field name, e.g. `agentMessaged`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ActivityFilter {
    #[must_use]
    pub const fn any() -> Self {
        Self {
            originator: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn new(originator: Option<Originator>, kind: Option<String>) -> Self {
        Self { originator, kind }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.originator.is_some() || self.kind.is_some()
    }

    #[must_use]
    pub fn matches(&self, activity: &Activity) -> bool {
        if let Some(originator) = &self.originator {
            if activity.originator.as_ref() != Some(originator) {
                return false;
            }
        }
        if let Some(kind) = self.kind.as_deref() {
            if !activity.has_field(kind) {
                return false;
            }
        }
        true
    }

    /// Keep only matching activities, preserving order.
    pub fn apply(&self, activities: impl IntoIterator<Item = Activity>) -> Vec<Activity> {
        activities
            .into_iter()
            .filter(|activity| self.matches(activity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::activity;

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ActivityFilter::any();
        assert!(!filter.is_active());
        assert!(filter.matches(&activity("a1", Originator::User, "userMessaged")));
        assert!(filter.matches(&activity("a2", Originator::Agent, "planGenerated")));
    }

    #[test]
    fn originator_dimension() {
        let filter = ActivityFilter::new(Some(Originator::Agent), None);
        assert!(filter.is_active());
        assert!(filter.matches(&activity("a1", Originator::Agent, "agentMessaged")));
        assert!(!filter.matches(&activity("a2", Originator::User, "userMessaged")));

        let mut bare = activity("a3", Originator::Agent, "agentMessaged");
        bare.originator = None;
        assert!(!filter.matches(&bare));
    }

    #[test]
    fn kind_requires_field_presence() {
        let filter = ActivityFilter::new(None, Some("agentMessaged".to_string()));
        assert!(filter.matches(&activity("a1", Originator::Agent, "agentMessaged")));
        assert!(!filter.matches(&activity("a2", Originator::Agent, "planGenerated")));
    }

    #[test]
    fn both_dimensions_must_hold() {
        let filter = ActivityFilter::new(Some(Originator::User), Some("userMessaged".to_string()));
        assert!(filter.matches(&activity("a1", Originator::User, "userMessaged")));
        assert!(!filter.matches(&activity("a2", Originator::Agent, "userMessaged")));
        assert!(!filter.matches(&activity("a3", Originator::User, "planGenerated")));
    }

    #[test]
    fn apply_preserves_order() {
        let filter = ActivityFilter::new(Some(Originator::User), None);
        let kept = filter.apply(vec![
            activity("a1", Originator::User, "userMessaged"),
            activity("a2", Originator::Agent, "agentMessaged"),
            activity("a3", Originator::User, "userMessaged"),
        ]);
        let ids: Vec<_> = kept.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a3"]);
    }
}
