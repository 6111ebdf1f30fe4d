//! The landing flow: classify an outgoing range, cross-check its bug
//! against Bugzilla, and drive the comment/resolve (or reopen) mutation
//! behind explicit confirmations.

use crate::bugzilla::{self, build_update, BugRecord, BugTracker, BugzillaClient};
use crate::cli::LandArgs;
use crate::config::Config;
use crate::console::{self, Prompt, StdinPrompt};
use crate::patch::{Patch, PatchKind};
use crate::validate::{InteractiveValidator, Validator};
use crate::vcs::{CommitRecord, HgClient, Vcs};
use crate::version::PackageVersion;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::env;

pub fn run_land(args: LandArgs) -> Result<()> {
    let root = env::current_dir().context("resolve repository root")?;
    let vcs = HgClient::open(&root)?;
    let config = Config::load()?;
    let tracker = BugzillaClient::from_config(&config);
    bugzilla::login_note(&tracker);

    let mut prompt = StdinPrompt;
    let mut validator = InteractiveValidator::new(Box::new(StdinPrompt));

    let version = PackageVersion::from_repo(&vcs, &root, None, &mut validator)?;
    console::info(&format!("Landing into {version}"));

    match (&args.bug, &args.landed) {
        (Some(bug), Some(landed)) => {
            let commits = vcs.log(landed)?;
            if commits.len() != 1 {
                return Err(validator.fatal(&format!("Couldn't find revision {landed}")));
            }
            let patches = collect_patches(&commits, &version, &mut validator)?;
            resolve(
                &vcs,
                &tracker,
                &mut prompt,
                &mut validator,
                &version,
                bug,
                &patches,
            )
        }
        (None, None) => {
            let commits = vcs.outgoing(&args.revrange)?;
            if commits.is_empty() {
                return Err(validator.fatal("No changes found"));
            }
            let patches = collect_patches(&commits, &version, &mut validator)?;
            process_patches(
                &vcs,
                &tracker,
                &mut prompt,
                &mut validator,
                &version,
                &args.revrange,
                &patches,
            )
        }
        _ => Err(validator.fatal("You have to specify --bug and --landed together")),
    }
}

/// Classify every commit in the range, in order, cross-checking any release
/// tag against the header-declared version.
pub fn collect_patches(
    commits: &[CommitRecord],
    version: &PackageVersion,
    validator: &mut dyn Validator,
) -> Result<Vec<Patch>> {
    let mut patches = Vec::with_capacity(commits.len());
    for commit in commits {
        let patch = Patch::classify(commit, validator)?;
        console::log(&format!("Headline: {}", patch.headline));
        patch.verify_tag_version(version, validator)?;
        patches.push(patch);
    }
    Ok(patches)
}

/// One landing references exactly one bug across its non-tag commits; one
/// Bugzilla comment cannot meaningfully represent two unrelated bugs.
fn single_bug<'a>(patches: &'a [Patch], validator: &mut dyn Validator) -> Result<&'a str> {
    let bugs: BTreeSet<&str> = patches
        .iter()
        .filter(|patch| !patch.is_tag())
        .filter_map(Patch::bug)
        .collect();

    let mut iter = bugs.into_iter();
    match (iter.next(), iter.next()) {
        (Some(bug), None) => Ok(bug),
        (None, _) => Err(validator.fatal("No bug number found in the revision range")),
        (Some(first), Some(second)) => Err(validator.fatal(&format!(
            "Multiple bugs in one revrange: {first}, {second}"
        ))),
    }
}

fn bug_status_check(
    bugdata: &BugRecord,
    patch: &Patch,
    validator: &mut dyn Validator,
) -> Result<()> {
    match &patch.kind {
        PatchKind::Patch { .. } => {
            if !matches!(bugdata.status.as_str(), "NEW" | "ASSIGNED" | "REOPENED") {
                validator.warn(&format!(
                    "Bug {} is in an odd state for a patch: {}",
                    bugdata.id, bugdata.status
                ))?;
            }
        }
        PatchKind::Backout { .. } => {
            if bugdata.status != "RESOLVED" {
                validator.warn(&format!(
                    "Bug {} is in an odd state for a backout: {}",
                    bugdata.id, bugdata.status
                ))?;
            }
        }
        PatchKind::Tag { .. } => {
            return Err(validator.fatal("Tags don't carry a bug to status-check"))
        }
    }
    Ok(())
}

/// Host/path part of the default push URL, normalized for rev links.
fn repo_host(vcs: &dyn Vcs) -> Result<String> {
    let url = vcs.paths("default")?;
    let mut host = url
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .trim_end()
        .to_string();
    if !host.ends_with('/') {
        host.push('/');
    }
    Ok(host)
}

/// Build the landing comment and, behind a confirmation, submit it with the
/// matching status transition: RESOLVED/FIXED for patches, REOPENED for a
/// backout.
pub fn resolve(
    vcs: &dyn Vcs,
    tracker: &dyn BugTracker,
    prompt: &mut dyn Prompt,
    validator: &mut dyn Validator,
    version: &PackageVersion,
    bug: &str,
    patches: &[Patch],
) -> Result<()> {
    let repo = repo_host(vcs)?;
    let bugdata = tracker.get_bug(bug)?;

    let mut comment = String::new();
    for patch in patches.iter().filter(|patch| !patch.is_tag()) {
        bug_status_check(&bugdata, patch, validator)?;
        comment.push_str(&format!("https://{}rev/{}\n", repo, patch.hash));
    }

    console::info(&format!("Adding comment to bug {bug}:"));

    // A range containing any backout reopens; otherwise it resolves.
    let backout_reason = patches.iter().find_map(|patch| match &patch.kind {
        PatchKind::Backout { reason, .. } => Some(
            reason
                .clone()
                .unwrap_or_else(|| "an unspecified reason".to_string()),
        ),
        _ => None,
    });

    match backout_reason {
        None => {
            console::log(&comment);
            if prompt.confirm("Submit this comment and resolve the bug?")? {
                let update = build_update(
                    &comment,
                    "RESOLVED",
                    "FIXED",
                    &version.number,
                    Some("checkin-needed"),
                );
                tracker.update_bugs(&[bug], &update)?;
                console::info(&format!("Resolved {}", bugdata.weburl));
            }
        }
        Some(reason) => {
            let comment = format!("Backed out for {reason}\n{comment}");
            console::log(&comment);
            if prompt.confirm("Submit this comment and reopen the bug?")? {
                let update = build_update(&comment, "REOPENED", "---", "---", None);
                tracker.update_bugs(&[bug], &update)?;
                console::info(&format!("Reopened {}", bugdata.weburl));
            }
        }
    }
    Ok(())
}

/// Cross-check the (single) bug behind a range of classified patches, then
/// walk the operator through push and resolution.
pub fn process_patches(
    vcs: &dyn Vcs,
    tracker: &dyn BugTracker,
    prompt: &mut dyn Prompt,
    validator: &mut dyn Validator,
    version: &PackageVersion,
    revrange: &str,
    patches: &[Patch],
) -> Result<()> {
    let bug = single_bug(patches, validator)?.to_string();

    let bugdata = tracker.get_bug(&bug)?;
    console::info(&format!("Bug {}: {}", bugdata.id, bugdata.summary));
    console::log(&format!("Component: {}", bugdata.component));
    console::log(&bugdata.weburl);
    console::log(&bugdata.status);
    console::log(&format!("Target: {}", bugdata.target_milestone));

    let component = version.component.name();
    if bugdata.component != component && bugdata.product != component {
        return Err(validator.fatal(&format!(
            "Bug component mismatch. Bug is for {}, but we're in {}",
            bugdata.component, component
        )));
    }
    if bugdata.target_milestone != version.number {
        validator.warn(&format!(
            "Bug target milestone ({}) is not set to {}",
            bugdata.target_milestone, version.number
        ))?;
    }

    for patch in patches.iter().filter(|patch| !patch.is_tag()) {
        patch.validate(validator)?;
        bug_status_check(&bugdata, patch, validator)?;
    }

    if prompt.confirm("Push and resolve bug?")? {
        console::log("Now run:");
        console::info(&format!("  hg push -r {revrange}"));

        if prompt.confirm("Was your push successful?")? {
            resolve(vcs, tracker, prompt, validator, version, &bug, patches)?;
        }
    }
    Ok(())
}
