//! The commit-headline and version-header grammar.
//!
//! Each headline form is a small versioned grammar with an explicit
//! fallback chain (strict template, loose indicator, bare changeset).
//! The tiers are kept separate on purpose: collapsing them would lose the
//! distinction between "well-formed", "salvageable", and "unparseable".

use regex::Regex;

/// Mercurial's tag-announcement headlines all start with this.
pub(crate) const TAG_PREFIX: &str = "Added tag ";

/// Anchored bug headline: the bug number plus everything after it.
pub(crate) fn bug_headline() -> Regex {
    Regex::new(r"^[Bb]ug (?P<bug>[0-9]+)(?P<rest>.*)$").expect("regex for bug headline")
}

/// Reviewer annotation tail: `r=name` or `r?name`, possibly chained.
pub(crate) fn reviewers() -> Regex {
    Regex::new(r" (?P<reviewers>r[?=].*)").expect("regex for reviewer markers")
}

/// Loose backout indicator, every casing the tree has actually seen.
pub(crate) fn backout_indicator() -> Regex {
    Regex::new(r"(backout|back.* out|Back.* out|Backout)").expect("regex for backout indicator")
}

/// Strict backout template: changeset, bug, and reason all present.
pub(crate) fn backout_template() -> Regex {
    Regex::new(
        r"^[Bb]acked out changeset (?P<changeset>[a-z0-9]+) \([Bb]ug (?P<bug>[0-9]+)\) for (?P<reason>.+)$",
    )
    .expect("regex for backout template")
}

/// Fallback when the strict template misses: any bare changeset reference.
pub(crate) fn backout_changeset() -> Regex {
    Regex::new(r"changeset (?P<changeset>[a-z0-9]+)").expect("regex for backout changeset")
}

/// The full tag-announcement form. Machine generated, so anchored and strict.
pub(crate) fn tag_announcement() -> Regex {
    Regex::new(r"^Added tag (?P<tag>[A-Z0-9_]+) for changeset (?P<changeset>[a-z0-9]+)")
        .expect("regex for tag announcement")
}

pub(crate) fn nss_version() -> Regex {
    Regex::new(r#"#define NSS_VERSION "(?P<version>[0-9.]+)""#).expect("regex for NSS version")
}

/// NSPR tolerates a suffix after the numeric part (`"4.32.1 Beta"`).
pub(crate) fn nspr_version() -> Regex {
    Regex::new(r#"#define PR_VERSION +"(?P<version>[0-9.]+).*""#).expect("regex for NSPR version")
}
