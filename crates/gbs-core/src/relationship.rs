//! Branch relationship classifier and display ordering

use crate::{BranchView, RelationshipKind};
use std::cmp::Ordering;

/// Classify a candidate branch against HEAD.
///
/// `ahead` counts commits reachable from HEAD but not from the candidate,
/// `behind` the reverse. Callers that could not compute the graph distance
/// pass `0, 0` and let tip equality decide.
pub fn classify(is_self: bool, ahead: usize, behind: usize, tip_hash_equal: bool) -> RelationshipKind {
    if is_self {
        return RelationshipKind::Current;
    }

    match (ahead > 0, behind > 0) {
        (true, true) => RelationshipKind::Diverged,
        (true, false) => RelationshipKind::Ahead,
        (false, true) => RelationshipKind::Behind,
        (false, false) if tip_hash_equal => RelationshipKind::Identical,
        (false, false) => RelationshipKind::Unknown,
    }
}

/// Sort branches for display: HEAD first, then byte-wise ascending names.
///
/// With `promote_upstream`, a branch literally named `origin/<head>` is moved
/// directly after HEAD.
pub fn sort_for_display(branches: &mut [BranchView], head_name: &str, promote_upstream: bool) {
    let upstream = format!("origin/{}", head_name);

    branches.sort_by(|a, b| {
        let rank = |v: &BranchView| -> u8 {
            if v.is_head || v.name == head_name {
                0
            } else if promote_upstream && v.name == upstream {
                1
            } else {
                2
            }
        };

        match rank(a).cmp(&rank(b)) {
            Ordering::Equal => a.name.as_bytes().cmp(b.name.as_bytes()),
            other => other,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(name: &str, is_head: bool) -> BranchView {
        BranchView {
            name: name.to_string(),
            is_head,
            last_commit: None,
            relationship: if is_head {
                RelationshipKind::Current
            } else {
                RelationshipKind::Unknown
            },
        }
    }

    fn names(views: &[BranchView]) -> Vec<&str> {
        views.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_self_wins_over_everything() {
        for (ahead, behind, eq) in [(0, 0, false), (3, 0, true), (0, 2, false), (1, 1, true)] {
            assert_eq!(classify(true, ahead, behind, eq), RelationshipKind::Current);
        }
    }

    #[test]
    fn test_counts() {
        assert_eq!(classify(false, 3, 0, false), RelationshipKind::Ahead);
        assert_eq!(classify(false, 3, 0, true), RelationshipKind::Ahead);
        assert_eq!(classify(false, 0, 2, false), RelationshipKind::Behind);
        assert_eq!(classify(false, 0, 2, true), RelationshipKind::Behind);
        assert_eq!(classify(false, 1, 1, false), RelationshipKind::Diverged);
        assert_eq!(classify(false, 1, 1, true), RelationshipKind::Diverged);
    }

    #[test]
    fn test_zero_counts_resolve_by_tip() {
        assert_eq!(classify(false, 0, 0, true), RelationshipKind::Identical);
        assert_eq!(classify(false, 0, 0, false), RelationshipKind::Unknown);
    }

    #[test]
    fn test_sort_alphabetical_after_head() {
        let mut branches = vec![
            view("origin/main", false),
            view("feature/x", false),
            view("main", true),
        ];
        sort_for_display(&mut branches, "main", false);
        assert_eq!(names(&branches), vec!["main", "feature/x", "origin/main"]);
    }

    #[test]
    fn test_sort_promotes_upstream() {
        let mut branches = vec![
            view("feature/x", false),
            view("origin/main", false),
            view("main", true),
            view("alpha", false),
        ];
        sort_for_display(&mut branches, "main", true);
        assert_eq!(
            names(&branches),
            vec!["main", "origin/main", "alpha", "feature/x"]
        );
    }

    #[test]
    fn test_sort_is_bytewise() {
        let mut branches = vec![view("b", false), view("B", false), view("a", false), view("main", true)];
        sort_for_display(&mut branches, "main", true);
        assert_eq!(names(&branches), vec!["main", "B", "a", "b"]);
    }

    #[test]
    fn test_sort_without_upstream_present() {
        let mut branches = vec![view("zeta", false), view("dev", true), view("origin/main", false)];
        sort_for_display(&mut branches, "dev", true);
        assert_eq!(names(&branches), vec!["dev", "origin/main", "zeta"]);
    }
}
