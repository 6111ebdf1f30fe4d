//! CLI argument parsing for the release-engineering workflows.
//!
//! The CLI is intentionally thin: each subcommand hands its arguments to a
//! workflow module and everything interesting happens there.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nsst",
    version,
    about = "Release-engineering helpers for NSS and NSPR",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify outgoing commits and drive the Bugzilla resolve flow
    Land(LandArgs),
    /// Build the resolved-bug listing and contributor report for a release
    ReleaseNotes(ReleaseNotesArgs),
    /// Walk the code-review checklist and print a review summary
    Review(ReviewArgs),
}

#[derive(Parser, Debug)]
pub struct LandArgs {
    /// Bug number to resolve, used with --landed
    #[arg(short, long)]
    pub bug: Option<String>,

    /// As-landed hg revision, used with --bug
    #[arg(short, long)]
    pub landed: Option<String>,

    /// hg revision range
    #[arg(short, long, default_value = ".")]
    pub revrange: String,
}

#[derive(Parser, Debug)]
pub struct ReleaseNotesArgs {
    /// hg revision range like `reverse(startHash::endHash)`
    #[arg(short, long, default_value = "reverse(ancestors(.))")]
    pub revrange: String,

    /// Provide HTML suitable for the release notes
    #[arg(long)]
    pub html: bool,
}

#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Checklist YAML to walk
    #[arg(
        long,
        value_name = "PATH",
        default_value = "nss-code-review-checklist.yaml"
    )]
    pub checklist: PathBuf,
}
