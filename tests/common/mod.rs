//! Shared in-memory fakes for the workflow integration tests.

// Each test binary uses its own subset of the fixtures.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use nss_tools::bugzilla::{BugRecord, BugTracker, BugUpdate};
use nss_tools::console::Prompt;
use nss_tools::vcs::{CommitRecord, Vcs};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

pub fn commit(id: i64, hash: &str, author: &str, message: &str) -> CommitRecord {
    CommitRecord {
        id: id.to_string(),
        hash: hash.to_string(),
        author: author.to_string(),
        message: message.to_string(),
        timestamp: 1_700_000_000 + id,
    }
}

pub fn bug(id: u64, status: &str, product: &str, milestone: &str, summary: &str) -> BugRecord {
    BugRecord {
        id,
        status: status.to_string(),
        product: product.to_string(),
        component: "Libraries".to_string(),
        target_milestone: milestone.to_string(),
        summary: summary.to_string(),
        groups: Vec::new(),
        weburl: format!("https://bugzilla.mozilla.org/show_bug.cgi?id={id}"),
    }
}

/// Serves a fixed commit list for any revision range; `log` answers for the
/// target range first, then for the ancestor range.
pub struct FakeVcs {
    pub logs: RefCell<VecDeque<Vec<CommitRecord>>>,
    pub headers: BTreeMap<String, Vec<u8>>,
    pub default_path: String,
}

impl FakeVcs {
    pub fn with_commits(commits: Vec<CommitRecord>) -> Self {
        Self {
            logs: RefCell::new(VecDeque::from([commits])),
            headers: BTreeMap::from([(
                "lib/nss/nss.h".to_string(),
                b"#define NSS_VERSION \"3.68.1\"\n".to_vec(),
            )]),
            default_path: "ssh://releaser@hg.mozilla.org/projects/nss/".to_string(),
        }
    }

    pub fn push_log(&self, commits: Vec<CommitRecord>) {
        self.logs.borrow_mut().push_back(commits);
    }
}

impl Vcs for FakeVcs {
    fn log(&self, _revrange: &str) -> Result<Vec<CommitRecord>> {
        let mut logs = self.logs.borrow_mut();
        let front = logs.pop_front().ok_or_else(|| anyhow!("no scripted log"))?;
        if logs.is_empty() {
            logs.push_back(front.clone());
        }
        Ok(front)
    }

    fn outgoing(&self, revrange: &str) -> Result<Vec<CommitRecord>> {
        self.log(revrange)
    }

    fn cat(&self, path: &str, _rev: Option<&str>) -> Result<Vec<u8>> {
        self.headers
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such file: {path}"))
    }

    fn paths(&self, _name: &str) -> Result<String> {
        Ok(self.default_path.clone())
    }
}

/// Records every mutation; refuses nothing.
pub struct FakeBugTracker {
    pub bugs: BTreeMap<String, BugRecord>,
    pub updates: RefCell<Vec<(Vec<String>, BugUpdate)>>,
}

impl FakeBugTracker {
    pub fn with_bug(id: &str, record: BugRecord) -> Self {
        Self {
            bugs: BTreeMap::from([(id.to_string(), record)]),
            updates: RefCell::new(Vec::new()),
        }
    }
}

impl BugTracker for FakeBugTracker {
    fn get_bug(&self, id: &str) -> Result<BugRecord> {
        self.bugs
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("no bug {id}"))
    }

    fn update_bugs(&self, ids: &[&str], update: &BugUpdate) -> Result<()> {
        self.updates.borrow_mut().push((
            ids.iter().map(|id| id.to_string()).collect(),
            update.clone(),
        ));
        Ok(())
    }
}

/// Answers confirmations from a fixed script, in order.
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected prompt: {message}"))
    }
}
