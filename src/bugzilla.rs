//! The Bugzilla query/mutation surface.
//!
//! The workflows only need one bug at a time and one update payload per
//! landing; [`BugzillaClient`] is a thin shell over the Bugzilla REST API.

use crate::config::Config;
use crate::console;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The bug fields the workflows cross-check.
#[derive(Clone, Debug, Deserialize)]
pub struct BugRecord {
    pub id: u64,
    pub status: String,
    pub product: String,
    pub component: String,
    pub target_milestone: String,
    pub summary: String,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Not part of the REST payload; filled in by the client.
    #[serde(skip)]
    pub weburl: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CommentBody {
    pub body: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct KeywordsUpdate {
    pub remove: Vec<String>,
}

/// One status-change-plus-comment mutation.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BugUpdate {
    pub comment: CommentBody,
    pub status: String,
    pub resolution: String,
    pub target_milestone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordsUpdate>,
}

pub fn build_update(
    comment: &str,
    status: &str,
    resolution: &str,
    target_milestone: &str,
    keywords_remove: Option<&str>,
) -> BugUpdate {
    BugUpdate {
        comment: CommentBody {
            body: comment.to_string(),
        },
        status: status.to_string(),
        resolution: resolution.to_string(),
        target_milestone: target_milestone.to_string(),
        keywords: keywords_remove.map(|keyword| KeywordsUpdate {
            remove: vec![keyword.to_string()],
        }),
    }
}

pub trait BugTracker {
    fn get_bug(&self, id: &str) -> Result<BugRecord>;
    fn update_bugs(&self, ids: &[&str], update: &BugUpdate) -> Result<()>;
}

#[derive(Deserialize)]
struct BugsResponse {
    bugs: Vec<BugRecord>,
}

/// REST client for one Bugzilla instance.
pub struct BugzillaClient {
    base_url: String,
    api_key: Option<String>,
}

impl BugzillaClient {
    pub const DEFAULT_URL: &'static str = "https://bugzilla.mozilla.org";

    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let base_url = config.bugzilla_url.as_deref().unwrap_or(Self::DEFAULT_URL);
        Self::new(base_url, config.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn logged_in(&self) -> bool {
        self.api_key.is_some()
    }

    fn bug_url(&self, id: &str) -> String {
        format!("{}/rest/bug/{}", self.base_url, id)
    }
}

impl BugTracker for BugzillaClient {
    fn get_bug(&self, id: &str) -> Result<BugRecord> {
        let start = Instant::now();
        let mut request = ureq::get(self.bug_url(id));
        if let Some(key) = &self.api_key {
            request = request.header("X-BUGZILLA-API-KEY", key);
        }
        let mut response = request.call().with_context(|| format!("fetch bug {id}"))?;
        let mut parsed: BugsResponse = response
            .body_mut()
            .read_json()
            .with_context(|| format!("parse bug {id}"))?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::debug!(elapsed_ms, bug = id, "bugzilla fetch complete");

        let mut bug = parsed
            .bugs
            .pop()
            .ok_or_else(|| anyhow!("Bugzilla returned no data for bug {id}"))?;
        bug.weburl = format!("{}/show_bug.cgi?id={}", self.base_url, bug.id);
        Ok(bug)
    }

    fn update_bugs(&self, ids: &[&str], update: &BugUpdate) -> Result<()> {
        #[derive(Serialize)]
        struct Payload<'a> {
            ids: &'a [&'a str],
            #[serde(flatten)]
            update: &'a BugUpdate,
        }

        let first = ids.first().ok_or_else(|| anyhow!("no bugs to update"))?;
        let start = Instant::now();
        let mut request = ureq::put(self.bug_url(first));
        if let Some(key) = &self.api_key {
            request = request.header("X-BUGZILLA-API-KEY", key);
        }
        request
            .send_json(Payload { ids, update })
            .with_context(|| format!("update bugs {}", ids.join(",")))?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::debug!(elapsed_ms, bugs = %ids.join(","), "bugzilla update complete");
        Ok(())
    }
}

/// Print where we're pointed and, when logged out, how to fix that.
pub fn login_note(client: &BugzillaClient) {
    if client.logged_in() {
        console::info(&format!(
            "Interacting with Bugzilla at {}. Logged in = true",
            client.base_url()
        ));
        return;
    }
    console::attention(
        "Note: Not logging into Bugzilla. BZ actions won't work. Make a file at ~/.nss-land-commit.json",
    );
    console::attention("with contents like:");
    console::log(
        &serde_json::json!({"api_key": "random_api_key_1e87d00d1c2fb"}).to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_update_carries_keyword_removal() {
        let update = build_update(
            "landed",
            "RESOLVED",
            "FIXED",
            "3.68.1",
            Some("checkin-needed"),
        );
        assert_eq!(update.status, "RESOLVED");
        assert_eq!(update.resolution, "FIXED");
        assert_eq!(update.target_milestone, "3.68.1");
        assert_eq!(
            update.keywords,
            Some(KeywordsUpdate {
                remove: vec!["checkin-needed".to_string()]
            })
        );
    }

    #[test]
    fn reopen_update_serializes_without_keywords() {
        let update = build_update("backed out", "REOPENED", "---", "---", None);
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json["status"], "REOPENED");
        assert_eq!(json["comment"]["body"], "backed out");
        assert!(json.get("keywords").is_none());
    }

    #[test]
    fn bug_records_parse_from_rest_payload() {
        let payload = r#"{"bugs": [{
            "id": 1700001,
            "status": "ASSIGNED",
            "product": "NSS",
            "component": "Libraries",
            "target_milestone": "3.68.1",
            "summary": "Fix null pointer in cert validation",
            "groups": [],
            "whiteboard": ""
        }]}"#;
        let parsed: BugsResponse = serde_json::from_str(payload).expect("parse");
        assert_eq!(parsed.bugs[0].id, 1_700_001);
        assert_eq!(parsed.bugs[0].status, "ASSIGNED");
    }

    #[test]
    fn client_normalizes_trailing_slash() {
        let client = BugzillaClient::new("https://bugzilla.example.org/", None);
        assert_eq!(client.bug_url("17"), "https://bugzilla.example.org/rest/bug/17");
    }
}
