//! The Mercurial query surface.
//!
//! The classification core only needs ordered commit records, file
//! contents at a revision, and the configured path URL; [`HgClient`] is a
//! thin shell over the system `hg` binary that provides exactly that.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

/// One revision as the VCS reports it. Field order mirrors the hg log
/// tuple: sequence id, hash, author, message, timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub hash: String,
    pub author: String,
    pub message: String,
    pub timestamp: i64,
}

pub trait Vcs {
    /// Commits selected by `revrange`, in the order hg returns them.
    fn log(&self, revrange: &str) -> Result<Vec<CommitRecord>>;

    /// Commits that would be pushed; empty when there are none.
    fn outgoing(&self, revrange: &str) -> Result<Vec<CommitRecord>>;

    /// Contents of `path` at `rev` (working parent when `rev` is `None`).
    fn cat(&self, path: &str, rev: Option<&str>) -> Result<Vec<u8>>;

    /// Configured URL for the named path alias.
    fn paths(&self, name: &str) -> Result<String>;
}

/// One entry of `hg log -Tjson`.
#[derive(Deserialize)]
struct HgLogEntry {
    rev: i64,
    node: String,
    user: String,
    desc: String,
    /// `[epoch_seconds, tz_offset]`
    date: (f64, i64),
}

impl From<HgLogEntry> for CommitRecord {
    fn from(entry: HgLogEntry) -> Self {
        Self {
            id: entry.rev.to_string(),
            hash: entry.node,
            author: entry.user,
            message: entry.desc,
            timestamp: entry.date.0 as i64,
        }
    }
}

/// Shell over the system `hg` binary, JSON templater output.
pub struct HgClient {
    hg: PathBuf,
    root: PathBuf,
}

impl HgClient {
    pub fn open(root: &Path) -> Result<Self> {
        let hg = which::which("hg").context("hg not found on PATH")?;
        Ok(Self {
            hg,
            root: root.to_path_buf(),
        })
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let start = Instant::now();
        let output = Command::new(&self.hg)
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("run hg {}", args.join(" ")))?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::debug!(
            elapsed_ms,
            stdout_bytes = output.stdout.len(),
            status = output.status.code(),
            "hg {} complete",
            args.first().copied().unwrap_or_default()
        );

        Ok(output)
    }

    fn run_checked(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(anyhow!(
                "Mercurial error: hg {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr_first_line(&output)
            ));
        }
        Ok(output.stdout)
    }

    fn parse_log(bytes: &[u8]) -> Result<Vec<CommitRecord>> {
        let entries: Vec<HgLogEntry> =
            serde_json::from_slice(bytes).context("parse hg json log")?;
        Ok(entries.into_iter().map(CommitRecord::from).collect())
    }
}

fn stderr_first_line(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr.trim().lines().next().unwrap_or_default().to_string()
}

impl Vcs for HgClient {
    fn log(&self, revrange: &str) -> Result<Vec<CommitRecord>> {
        let stdout = self.run_checked(&["log", "-r", revrange, "-Tjson"])?;
        Self::parse_log(&stdout)
    }

    fn outgoing(&self, revrange: &str) -> Result<Vec<CommitRecord>> {
        // hg exits 1 when there is nothing outgoing; -q keeps the
        // "comparing with" chatter out of the JSON stream.
        let output = self.run(&["outgoing", "-q", "-r", revrange, "-Tjson"])?;
        match output.status.code() {
            Some(0) => Self::parse_log(&output.stdout),
            Some(1) => Ok(Vec::new()),
            _ => Err(anyhow!(
                "Mercurial error: hg outgoing failed: {}",
                stderr_first_line(&output)
            )),
        }
    }

    fn cat(&self, path: &str, rev: Option<&str>) -> Result<Vec<u8>> {
        match rev {
            Some(rev) => self.run_checked(&["cat", path, "-r", rev]),
            None => self.run_checked(&["cat", path]),
        }
    }

    fn paths(&self, name: &str) -> Result<String> {
        let stdout = self.run_checked(&["paths", name])?;
        let url = String::from_utf8_lossy(&stdout).trim().to_string();
        if url.is_empty() {
            return Err(anyhow!("hg has no path named {name}"));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_log_entries_in_order() {
        let json = r#"[
            {"rev": 12, "node": "abc123de4f56", "branch": "default",
             "phase": "draft", "user": "Alice <alice@example.com>",
             "date": [1700000000.0, 0], "desc": "Bug 1 - First\n\nBody",
             "bookmarks": [], "tags": ["tip"], "parents": ["def"]},
            {"rev": 13, "node": "0123abcd4567", "branch": "default",
             "phase": "draft", "user": "Bob <bob@example.com>",
             "date": [1700000100.0, -3600], "desc": "Bug 2 - Second",
             "bookmarks": [], "tags": [], "parents": ["abc123de4f56"]}
        ]"#;

        let records = HgClient::parse_log(json.as_bytes()).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "12");
        assert_eq!(records[0].hash, "abc123de4f56");
        assert_eq!(records[0].author, "Alice <alice@example.com>");
        assert_eq!(records[0].message, "Bug 1 - First\n\nBody");
        assert_eq!(records[0].timestamp, 1_700_000_000);
        assert_eq!(records[1].id, "13");
    }

    #[test]
    fn rejects_malformed_log_output() {
        assert!(HgClient::parse_log(b"comparing with ssh://...").is_err());
    }
}
