// Contributor derivation and per-contributor narrowing of activity
use crate::domain::activity::{ActivityData, RepoActivity};
use std::collections::BTreeSet;

/// Selection value meaning "everyone".
pub const ALL_CONTRIBUTORS: &str = "all";

/// Distinct handles across commit authors, PR authors and issue authors,
/// sorted by byte order (case-sensitive).
pub fn contributors(data: &ActivityData) -> Vec<String> {
    let mut handles = BTreeSet::new();
    for repo in &data.repos {
        handles.extend(repo.commits.iter().filter_map(|c| c.author_login()));
        handles.extend(repo.pulls.iter().filter_map(|p| p.author_login()));
        handles.extend(repo.issues.iter().filter_map(|i| i.author_login()));
    }
    handles.into_iter().map(str::to_string).collect()
}

/// Narrow `data` to one contributor, dropping repositories left empty.
///
/// `None`, `""` and `"all"` return the input untouched.
pub fn filter_by_contributor(data: ActivityData, selection: Option<&str>) -> ActivityData {
    let handle = match selection.map(str::trim) {
        None | Some("") | Some(ALL_CONTRIBUTORS) => return data,
        Some(handle) => handle,
    };

    let repos = data
        .repos
        .into_iter()
        .map(|repo| RepoActivity {
            repo_full_name: repo.repo_full_name,
            commits: repo
                .commits
                .into_iter()
                .filter(|c| c.author_login() == Some(handle))
                .collect(),
            pulls: repo
                .pulls
                .into_iter()
                .filter(|p| p.author_login() == Some(handle))
                .collect(),
            issues: repo
                .issues
                .into_iter()
                .filter(|i| i.author_login() == Some(handle))
                .collect(),
        })
        .filter(|repo| !repo.is_empty())
        .collect();

    ActivityData {
        repos,
        window: data.window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::ActivityWindow;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample() -> ActivityData {
        serde_json::from_value(json!({
            "since": "2024-01-01T00:00:00Z",
            "until": "2024-01-08T00:00:00Z",
            "repos": [
                {
                    "repoFullName": "o/one",
                    "commits": [
                        { "commit": { "message": "c1" }, "author": { "login": "bob" } },
                        { "commit": { "message": "c2", "author": { "name": "Ghost" } }, "author": null }
                    ],
                    "pulls": [
                        { "title": "p1", "state": "open", "user": { "login": "Alice" }, "updated_at": "2024-01-02T00:00:00Z" }
                    ],
                    "issues": []
                },
                {
                    "repoFullName": "o/two",
                    "commits": [],
                    "pulls": [],
                    "issues": [
                        { "title": "i1", "state": "closed", "user": { "login": "alice" }, "updated_at": "2024-01-03T00:00:00Z" },
                        { "title": "i2", "state": "open", "user": { "login": "bob" }, "updated_at": "2024-01-03T00:00:00Z" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_contributors_sorted_case_sensitive_and_distinct() {
        assert_eq!(contributors(&sample()), vec!["Alice", "alice", "bob"]);
    }

    #[test]
    fn test_no_selection_is_identity() {
        let data = sample();
        assert_eq!(filter_by_contributor(data.clone(), None), data);
        assert_eq!(filter_by_contributor(data.clone(), Some("")), data);
        assert_eq!(filter_by_contributor(data.clone(), Some("all")), data);
    }

    #[test]
    fn test_filter_keeps_only_selected_items() {
        let filtered = filter_by_contributor(sample(), Some("bob"));

        assert_eq!(filtered.repos.len(), 2);
        assert_eq!(filtered.repos[0].commits.len(), 1);
        assert!(filtered.repos[0].pulls.is_empty());
        assert_eq!(filtered.repos[1].issues.len(), 1);
        assert_eq!(filtered.repos[1].issues[0].title, "i2");
        assert_eq!(
            filtered.window,
            ActivityWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
            )
        );
    }

    #[test]
    fn test_filter_drops_repositories_left_empty() {
        let filtered = filter_by_contributor(sample(), Some("Alice"));
        assert_eq!(filtered.repos.len(), 1);
        assert_eq!(filtered.repos[0].repo_full_name, "o/one");

        let nobody = filter_by_contributor(sample(), Some("carol"));
        assert!(nobody.repos.is_empty());
        assert!(nobody.repos.iter().all(|r| !r.is_empty()));
    }
}
