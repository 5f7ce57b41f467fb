//! ACL merging
//!
//! Combines a series ACL (broader) with an episode ACL (narrower) under a
//! [`MergeMode`]. Surviving series entries keep their order and come
//! first, followed by every episode entry in episode order.

use crate::access_control::types::{AccessControlEntry, AccessControlList, MergeMode};
use std::collections::HashSet;

/// Merge `episode` over `series` according to `mode`
pub fn merge_acls(
    series: &AccessControlList,
    episode: &AccessControlList,
    mode: MergeMode,
) -> AccessControlList {
    match mode {
        MergeMode::Override => episode.clone(),
        MergeMode::Roles => {
            let episode_roles: HashSet<&str> =
                episode.iter().map(|entry| entry.role.as_str()).collect();
            overlay(series, episode, |entry| {
                episode_roles.contains(entry.role.as_str())
            })
        }
        MergeMode::Actions => {
            let episode_pairs: HashSet<(&str, &str)> = episode
                .iter()
                .map(|entry| (entry.role.as_str(), entry.action.as_str()))
                .collect();
            overlay(series, episode, |entry| {
                episode_pairs.contains(&(entry.role.as_str(), entry.action.as_str()))
            })
        }
    }
}

/// Keep series entries the episode does not shadow, then append the episode
fn overlay<F>(series: &AccessControlList, episode: &AccessControlList, shadowed: F) -> AccessControlList
where
    F: Fn(&AccessControlEntry) -> bool,
{
    series
        .iter()
        .filter(|entry| !shadowed(*entry))
        .chain(episode.iter())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acl(entries: &[AccessControlEntry]) -> AccessControlList {
        AccessControlList::from_entries(entries.to_vec())
    }

    #[test]
    fn test_override_ignores_series() {
        let series = acl(&[AccessControlEntry::allow("student", "read")]);
        let episode = acl(&[AccessControlEntry::allow("teacher", "write")]);

        let merged = merge_acls(&series, &episode, MergeMode::Override);
        assert_eq!(merged, episode);
    }

    #[test]
    fn test_override_with_empty_episode_is_empty() {
        let series = acl(&[AccessControlEntry::allow("student", "read")]);
        let merged = merge_acls(&series, &AccessControlList::new(), MergeMode::Override);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_roles_keeps_untouched_roles() {
        let series = acl(&[
            AccessControlEntry::allow("student", "read"),
            AccessControlEntry::allow("teacher", "read"),
            AccessControlEntry::allow("teacher", "write"),
        ]);
        let episode = acl(&[AccessControlEntry::deny("student", "read")]);

        let merged = merge_acls(&series, &episode, MergeMode::Roles);
        assert_eq!(
            merged.entries(),
            &[
                AccessControlEntry::allow("teacher", "read"),
                AccessControlEntry::allow("teacher", "write"),
                AccessControlEntry::deny("student", "read"),
            ]
        );
    }

    #[test]
    fn test_actions_replaces_exact_pair_only() {
        let series = acl(&[
            AccessControlEntry::allow("student", "read"),
            AccessControlEntry::allow("student", "write"),
        ]);
        let episode = acl(&[AccessControlEntry::deny("student", "write")]);

        let merged = merge_acls(&series, &episode, MergeMode::Actions);
        assert_eq!(
            merged.entries(),
            &[
                AccessControlEntry::allow("student", "read"),
                AccessControlEntry::deny("student", "write"),
            ]
        );
    }

    #[test]
    fn test_merge_is_pure() {
        let series = acl(&[AccessControlEntry::allow("student", "read")]);
        let episode = acl(&[AccessControlEntry::allow("student", "write")]);

        let first = merge_acls(&series, &episode, MergeMode::Actions);
        let second = merge_acls(&series, &episode, MergeMode::Actions);
        assert_eq!(first, second);
        assert_eq!(series.len(), 1);
        assert_eq!(episode.len(), 1);
    }
}
