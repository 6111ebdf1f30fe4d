//! Release-notes reporting: the resolved-bug listing and new-contributor
//! detection over a revision range.

use crate::bugzilla::{self, BugRecord, BugTracker, BugzillaClient};
use crate::cli::ReleaseNotesArgs;
use crate::config::Config;
use crate::console;
use crate::patch::Patch;
use crate::validate::{NullValidator, SilentValidator, Validator};
use crate::vcs::{HgClient, Vcs};
use crate::version::PackageVersion;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Author sightings across the target range and the history before it.
#[derive(Default)]
pub struct ContributorsList {
    /// author -> seen in a previous release
    authors: BTreeMap<String, bool>,
}

impl ContributorsList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting; a previous-release sighting always wins.
    pub fn observe(&mut self, author: &str, previous_release: bool) {
        if previous_release || !self.authors.contains_key(author) {
            self.authors.insert(author.to_string(), previous_release);
        }
    }

    /// Authors only ever seen in the current range, sorted.
    pub fn new_contributors(&self) -> Vec<&str> {
        self.authors
            .iter()
            .filter(|(_, previous)| !**previous)
            .map(|(author, _)| author.as_str())
            .collect()
    }
}

/// Everything one scan of the target range produces.
pub struct ReleaseReport {
    pub bugs: BTreeMap<u64, BugRecord>,
    pub contributors: ContributorsList,
    pub last_hash: Option<String>,
}

pub fn run_release_notes(args: ReleaseNotesArgs) -> Result<()> {
    if !args.revrange.contains("reverse") {
        console::attention(
            "Warning: You almost certainly want a `reverse` command in your revrange!",
        );
    }

    let root = env::current_dir().context("resolve repository root")?;
    let vcs = HgClient::open(&root)?;
    let config = Config::load()?;
    let tracker = BugzillaClient::from_config(&config);
    bugzilla::login_note(&tracker);

    let mut validator = SilentValidator::new();
    let mut report = scan_range(&vcs, &tracker, &root, &args.revrange, &mut validator)?;

    if report.bugs.is_empty() {
        console::log("No patches found");
        return Ok(());
    }

    if args.html {
        console::log("\n");
        console::log(&html_listing(report.bugs.values()));
    } else {
        for bug in report.bugs.values() {
            console::log(&format!("Bug {} - {}", bug.id, bug.summary));
        }
    }

    mark_previous_contributors(&vcs, &mut report)?;

    console::log("(Apparently) new contributors:");
    for author in report.contributors.new_contributors() {
        console::log(author);
    }
    Ok(())
}

/// Walk the target range: classify, cross-check each patch's bug, collect
/// the resolved ones and the authors seen along the way.
pub fn scan_range(
    vcs: &dyn Vcs,
    tracker: &dyn BugTracker,
    root: &Path,
    revrange: &str,
    validator: &mut dyn Validator,
) -> Result<ReleaseReport> {
    let mut bugs = BTreeMap::new();
    let mut contributors = ContributorsList::new();
    let mut last_hash = None;

    for commit in vcs.log(revrange)? {
        let patch = Patch::classify(&commit, validator)?;
        console::log(&format!("{} - {}", patch.hash, patch));

        last_hash = Some(patch.hash.clone());

        let version = PackageVersion::from_repo(vcs, root, Some(&patch.hash), validator)?;

        if patch.is_tag() {
            continue;
        }
        let Some(bug) = patch.bug().map(str::to_string) else {
            continue;
        };

        contributors.observe(&patch.author, false);

        let bugdata = tracker.get_bug(&bug)?;

        if bugdata.product == "NSS" {
            if bugdata.target_milestone != version.number {
                validator.warn(&format!(
                    "Version mismatch! target_milestone set to {} but hg says {}",
                    bugdata.target_milestone, version.number
                ))?;
            }
        } else {
            validator.warn(&format!(
                "Bug {bug} is not for NSS ({}). Odd. Skipping.",
                bugdata.product
            ))?;
            continue;
        }

        if !matches!(bugdata.status.as_str(), "RESOLVED" | "VERIFIED") {
            validator.warn(&format!(
                "Status is not resolved! bug set to {}. Skipping.",
                bugdata.status
            ))?;
            continue;
        }

        bugs.insert(bugdata.id, bugdata);
    }

    Ok(ReleaseReport {
        bugs,
        contributors,
        last_hash,
    })
}

/// Everything before the range start counts as a previous release: scan the
/// ancestor history and mark its authors, so only genuinely new names
/// survive. Read-only, so anomalies in old commits are ignored outright.
pub fn mark_previous_contributors(vcs: &dyn Vcs, report: &mut ReleaseReport) -> Result<()> {
    let Some(last) = &report.last_hash else {
        return Ok(());
    };

    let ancestor_range = format!("reverse(ancestors({last}^))");
    console::log(&format!(
        "Gathering new contributors list ({ancestor_range})..."
    ));

    let mut validator = NullValidator;
    for commit in vcs.log(&ancestor_range)? {
        // Historical noise (pre-convention tags and the like) only costs us
        // that commit's author.
        let Ok(patch) = Patch::classify(&commit, &mut validator) else {
            continue;
        };
        report.contributors.observe(&patch.author, true);
    }
    Ok(())
}

pub fn html_listing<'a>(bugs: impl Iterator<Item = &'a BugRecord>) -> String {
    let mut out = String::from("<ul>\n");
    for bug in bugs {
        let sec = if bug.groups.is_empty() { "" } else { "🔐 " };
        out.push_str(&format!(
            "  <li><a href=\"{}\">{}Bug {}</a> - {}</li>\n",
            bug.weburl, sec, bug.id, bug.summary
        ));
    }
    out.push_str("</ul>\n");
    out
}
