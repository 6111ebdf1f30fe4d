//! Integration tests for the landing flow: classification feeding the
//! single-bug invariant, the push gate, and the resolve/reopen mutations.

mod common;

use common::{bug, commit, FakeBugTracker, FakeVcs, ScriptedPrompt};
use nss_tools::validate::{SilentValidator, Validator};
use nss_tools::version::{Component, PackageVersion};
use nss_tools::workflow::{collect_patches, process_patches};

fn version() -> PackageVersion {
    PackageVersion {
        component: Component::Nss,
        number: "3.68.1".to_string(),
    }
}

#[test]
fn multiple_bugs_in_one_range_are_fatal_before_any_mutation() {
    let commits = vec![
        commit(
            12,
            "abc123de4f56",
            "Alice <alice@example.com>",
            "Bug 1700001 - Fix null pointer in cert validation r=alice",
        ),
        commit(
            13,
            "0123abcd4567",
            "Bob <bob@example.com>",
            "Bug 1700002 - Update root CA list r=bob",
        ),
    ];
    let vcs = FakeVcs::with_commits(commits.clone());
    let tracker = FakeBugTracker::with_bug(
        "1700001",
        bug(1700001, "ASSIGNED", "NSS", "3.68.1", "Fix null pointer"),
    );
    let mut prompt = ScriptedPrompt::new(&[]);
    let mut validator = SilentValidator::new();

    let patches = collect_patches(&commits, &version(), &mut validator).expect("classify");
    let err = process_patches(
        &vcs,
        &tracker,
        &mut prompt,
        &mut validator,
        &version(),
        ".",
        &patches,
    )
    .unwrap_err();

    assert!(err.to_string().contains("Multiple bugs in one revrange"));
    assert!(tracker.updates.borrow().is_empty());
    assert!(prompt.asked.is_empty());
}

#[test]
fn landing_a_patch_resolves_the_bug_fixed() {
    let commits = vec![
        commit(
            12,
            "abc123de4f56",
            "Alice <alice@example.com>",
            "Bug 1700001 - Fix null pointer in cert validation r=alice",
        ),
        commit(
            13,
            "0123abcd4567",
            "Release Engineering <releng@example.com>",
            "Added tag NSS_3_68_1_RTM for changeset abc123de4f56",
        ),
    ];
    let vcs = FakeVcs::with_commits(commits.clone());
    let tracker = FakeBugTracker::with_bug(
        "1700001",
        bug(1700001, "ASSIGNED", "NSS", "3.68.1", "Fix null pointer"),
    );
    // Push and resolve bug? / Was your push successful? / Submit this comment?
    let mut prompt = ScriptedPrompt::new(&[true, true, true]);
    let mut validator = SilentValidator::new();

    let patches = collect_patches(&commits, &version(), &mut validator).expect("classify");
    process_patches(
        &vcs,
        &tracker,
        &mut prompt,
        &mut validator,
        &version(),
        ".",
        &patches,
    )
    .expect("landing flow");

    let updates = tracker.updates.borrow();
    assert_eq!(updates.len(), 1);
    let (ids, update) = &updates[0];
    assert_eq!(ids, &["1700001".to_string()]);
    assert_eq!(update.status, "RESOLVED");
    assert_eq!(update.resolution, "FIXED");
    assert_eq!(update.target_milestone, "3.68.1");
    assert_eq!(
        update.keywords.as_ref().map(|k| k.remove.clone()),
        Some(vec!["checkin-needed".to_string()])
    );
    // One rev link per non-tag commit, host taken from the default path.
    assert_eq!(
        update.comment.body,
        "https://hg.mozilla.org/projects/nss/rev/abc123de4f56\n"
    );
    assert!(validator.warnings().is_empty());
}

#[test]
fn landing_a_backout_reopens_the_bug() {
    let commits = vec![commit(
        14,
        "fedcba987654",
        "Alice <alice@example.com>",
        "Backed out changeset abc123de4f56 (bug 1700001) for causing build bustage",
    )];
    let vcs = FakeVcs::with_commits(commits.clone());
    let tracker = FakeBugTracker::with_bug(
        "1700001",
        bug(1700001, "RESOLVED", "NSS", "3.68.1", "Fix null pointer"),
    );
    let mut prompt = ScriptedPrompt::new(&[true, true, true]);
    let mut validator = SilentValidator::new();

    let patches = collect_patches(&commits, &version(), &mut validator).expect("classify");
    process_patches(
        &vcs,
        &tracker,
        &mut prompt,
        &mut validator,
        &version(),
        ".",
        &patches,
    )
    .expect("backout flow");

    let updates = tracker.updates.borrow();
    assert_eq!(updates.len(), 1);
    let (_, update) = &updates[0];
    assert_eq!(update.status, "REOPENED");
    assert_eq!(update.resolution, "---");
    assert_eq!(update.target_milestone, "---");
    assert!(update.keywords.is_none());
    assert!(update
        .comment
        .body
        .starts_with("Backed out for causing build bustage\n"));
    assert!(update
        .comment
        .body
        .contains("https://hg.mozilla.org/projects/nss/rev/fedcba987654"));
}

#[test]
fn declining_the_submit_confirmation_leaves_the_bug_untouched() {
    let commits = vec![commit(
        12,
        "abc123de4f56",
        "Alice <alice@example.com>",
        "Bug 1700001 - Fix null pointer in cert validation r=alice",
    )];
    let vcs = FakeVcs::with_commits(commits.clone());
    let tracker = FakeBugTracker::with_bug(
        "1700001",
        bug(1700001, "ASSIGNED", "NSS", "3.68.1", "Fix null pointer"),
    );
    let mut prompt = ScriptedPrompt::new(&[true, true, false]);
    let mut validator = SilentValidator::new();

    let patches = collect_patches(&commits, &version(), &mut validator).expect("classify");
    process_patches(
        &vcs,
        &tracker,
        &mut prompt,
        &mut validator,
        &version(),
        ".",
        &patches,
    )
    .expect("declined submit is not an error");

    assert!(tracker.updates.borrow().is_empty());
    assert_eq!(prompt.asked.len(), 3);
}

#[test]
fn component_mismatch_is_fatal() {
    let commits = vec![commit(
        12,
        "abc123de4f56",
        "Alice <alice@example.com>",
        "Bug 1700001 - Fix null pointer in cert validation r=alice",
    )];
    let vcs = FakeVcs::with_commits(commits.clone());
    let tracker = FakeBugTracker::with_bug(
        "1700001",
        bug(1700001, "ASSIGNED", "Firefox", "3.68.1", "Wrong product"),
    );
    let mut prompt = ScriptedPrompt::new(&[]);
    let mut validator = SilentValidator::new();

    let patches = collect_patches(&commits, &version(), &mut validator).expect("classify");
    let err = process_patches(
        &vcs,
        &tracker,
        &mut prompt,
        &mut validator,
        &version(),
        ".",
        &patches,
    )
    .unwrap_err();

    assert!(err.to_string().contains("Bug component mismatch"));
    assert!(tracker.updates.borrow().is_empty());
}

#[test]
fn tag_with_wrong_version_stops_collection() {
    let commits = vec![commit(
        13,
        "0123abcd4567",
        "Release Engineering <releng@example.com>",
        "Added tag NSS_3_67_0_RTM for changeset abc123de4f56",
    )];
    let mut validator = SilentValidator::new();

    let err = collect_patches(&commits, &version(), &mut validator).unwrap_err();
    assert!(err.to_string().contains("doesn't contain 3_68_1"));
}
