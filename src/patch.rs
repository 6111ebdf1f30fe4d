//! Commit classification: every raw commit record becomes exactly one
//! [`Patch`], typed by what its headline says it is.

use crate::console;
use crate::patterns;
use crate::validate::Validator;
use crate::vcs::CommitRecord;
use crate::version::PackageVersion;
use anyhow::Result;
use std::fmt;

/// Per-variant fields. Patch and backout headlines are human-authored and
/// parsed best-effort, so their fields stay optional; tag headlines are
/// machine-generated and their fields are not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchKind {
    Patch {
        bug: Option<String>,
        reviewers: Option<String>,
        description: Option<String>,
    },
    Backout {
        bug: Option<String>,
        changeset: Option<String>,
        reason: Option<String>,
    },
    Tag {
        tag: String,
        changeset: String,
    },
}

/// One classified commit: the envelope every variant shares plus the
/// variant fields. Built once per commit record, immutable after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub id: String,
    pub hash: String,
    pub author: String,
    pub message: String,
    pub headline: String,
    pub timestamp: i64,
    pub kind: PatchKind,
}

impl Patch {
    /// Classify one commit. First match wins, in fixed priority: backout
    /// indicator, then tag announcement, then ordinary patch. A backout
    /// headline that also carries a bug number must stay a backout;
    /// reopening and resolving a bug are different operations.
    pub fn classify(commit: &CommitRecord, validator: &mut dyn Validator) -> Result<Patch> {
        let headline = commit.message.lines().next().unwrap_or_default().to_string();

        let kind = if patterns::backout_indicator().is_match(&headline) {
            classify_backout(&headline, validator)?
        } else if headline.starts_with(patterns::TAG_PREFIX) {
            classify_tag(&headline, validator)?
        } else {
            classify_patch(&headline, validator)?
        };

        Ok(Patch {
            id: commit.id.clone(),
            hash: commit.hash.clone(),
            author: commit.author.clone(),
            message: commit.message.clone(),
            headline,
            timestamp: commit.timestamp,
            kind,
        })
    }

    /// The referenced bug number, for the variants that can carry one.
    pub fn bug(&self) -> Option<&str> {
        match &self.kind {
            PatchKind::Patch { bug, .. } | PatchKind::Backout { bug, .. } => bug.as_deref(),
            PatchKind::Tag { .. } => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self.kind, PatchKind::Tag { .. })
    }

    /// Post-hoc completeness check, warn-level throughout: an incomplete
    /// patch is survivable and the operator decides.
    pub fn validate(&self, validator: &mut dyn Validator) -> Result<()> {
        match &self.kind {
            PatchKind::Patch { bug, reviewers, .. } => {
                if bug.is_none() {
                    validator.warn("No bug number found in the headline")?;
                }
                if reviewers.is_none() {
                    validator.warn("No reviewers found in the headline")?;
                }
            }
            PatchKind::Backout {
                changeset, reason, ..
            } => {
                if changeset.is_none() {
                    validator.warn("Backout does not name the backed-out changeset")?;
                }
                if reason.is_none() {
                    validator.warn("Backout does not give a reason")?;
                }
            }
            PatchKind::Tag { .. } => {}
        }
        Ok(())
    }

    /// A release tag must embed the header-declared version with dots as
    /// underscores; a tag contradicting its own tree is a release-integrity
    /// defect. Non-tag patches pass trivially.
    pub fn verify_tag_version(
        &self,
        version: &PackageVersion,
        validator: &mut dyn Validator,
    ) -> Result<()> {
        let PatchKind::Tag { tag, .. } = &self.kind else {
            return Ok(());
        };
        let expected = version.tag_fragment();
        if !tag.contains(&expected) {
            return Err(validator.fatal(&format!("Tag {tag} doesn't contain {expected}")));
        }
        console::info(&format!(
            "Tag {tag} for version {} detected. Format looks good.",
            version.number
        ));
        Ok(())
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.kind {
            PatchKind::Patch { .. } => "patch",
            PatchKind::Backout { .. } => "backout",
            PatchKind::Tag { .. } => "tag",
        };
        match self.bug() {
            Some(bug) => write!(f, "[{label}] {bug}: {}", self.headline),
            None => write!(f, "[{label}] {}", self.headline),
        }
    }
}

fn classify_patch(headline: &str, validator: &mut dyn Validator) -> Result<PatchKind> {
    let (reviewers, reviewers_start) = match patterns::reviewers()
        .captures(headline)
        .and_then(|caps| caps.name("reviewers"))
    {
        Some(found) => (Some(found.as_str().to_string()), Some(found.start())),
        None => (None, None),
    };

    let Some(caps) = patterns::bug_headline().captures(headline) else {
        validator.warn("Headline does not follow the `Bug NNN - description` form")?;
        return Ok(PatchKind::Patch {
            bug: None,
            reviewers,
            description: None,
        });
    };

    let bug = caps.name("bug").map(|m| m.as_str().to_string());
    let rest_start = caps.name("rest").map_or(headline.len(), |m| m.start());
    let rest_end = reviewers_start.unwrap_or(headline.len()).max(rest_start);
    let description = clean_description(&headline[rest_start..rest_end]);

    Ok(PatchKind::Patch {
        bug,
        reviewers,
        description,
    })
}

/// Strip the `- ` / `: ` style separator off the summary text.
fn clean_description(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | ','))
        .trim_end();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn classify_backout(headline: &str, validator: &mut dyn Validator) -> Result<PatchKind> {
    if let Some(caps) = patterns::backout_template().captures(headline) {
        console::info("Backout detected. Format looks good.");
        return Ok(PatchKind::Backout {
            bug: Some(caps["bug"].to_string()),
            changeset: Some(caps["changeset"].to_string()),
            reason: Some(caps["reason"].to_string()),
        });
    }

    validator.warn(
        "Backout headline needs to be of the form: Backed out changeset X (bug Y) for REASON",
    )?;

    if let Some(caps) = patterns::backout_changeset().captures(headline) {
        return Ok(PatchKind::Backout {
            bug: None,
            changeset: Some(caps["changeset"].to_string()),
            reason: None,
        });
    }

    validator.warn("Backout headline doesn't name a changeset at all")?;
    Ok(PatchKind::Backout {
        bug: None,
        changeset: None,
        reason: None,
    })
}

fn classify_tag(headline: &str, validator: &mut dyn Validator) -> Result<PatchKind> {
    let Some(caps) = patterns::tag_announcement().captures(headline) else {
        return Err(validator.fatal("Tag headline isn't formatted as expected"));
    };
    Ok(PatchKind::Tag {
        tag: caps["tag"].to_string(),
        changeset: caps["changeset"].to_string(),
    })
}
