//! The interactive code-review checklist.
//!
//! A YAML file lists review rules grouped under headings; the operator
//! answers pass/skip/fail per rule and gets a markdown summary suitable
//! for pasting into the review.

use crate::cli::ReviewArgs;
use crate::console;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Skip,
    Fail,
}

impl Verdict {
    fn mark(self) -> &'static str {
        match self {
            Verdict::Pass => "✅ ",
            Verdict::Skip => "⏭  ",
            Verdict::Fail => "❌ ",
        }
    }
}

pub fn run_review(args: ReviewArgs) -> Result<()> {
    let content = fs::read_to_string(&args.checklist)
        .with_context(|| format!("read checklist {}", args.checklist.display()))?;
    let sections = parse_checklist(&content)?;

    console::log("h for help. y=pass, s=skip, n=fail\n");

    let mut results = Vec::new();
    for (heading, rules) in sections {
        console::log(&format!("## {heading} ##"));
        let mut verdicts = Vec::new();
        for rule in rules {
            let verdict = ask_verdict(&rule)?;
            verdicts.push((rule, verdict));
        }
        results.push((heading, verdicts));
    }

    console::log("\n");
    console::log(&render_summary(&results));
    Ok(())
}

/// The checklist is a YAML list of `heading -> [rule]` maps; heading order
/// is the walk order.
fn parse_checklist(content: &str) -> Result<Vec<(String, Vec<String>)>> {
    let segments: Vec<serde_yml::Mapping> =
        serde_yml::from_str(content).context("parse checklist YAML")?;

    let mut sections = Vec::new();
    for segment in &segments {
        for (heading, rules) in segment {
            let heading = heading
                .as_str()
                .ok_or_else(|| anyhow!("checklist headings must be strings"))?;
            let rules = rules
                .as_sequence()
                .ok_or_else(|| anyhow!("rules under {heading} must be a list"))?
                .iter()
                .map(|rule| {
                    rule.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| anyhow!("rules under {heading} must be strings"))
                })
                .collect::<Result<Vec<_>>>()?;
            sections.push((heading.to_string(), rules));
        }
    }
    Ok(sections)
}

fn ask_verdict(rule: &str) -> Result<Verdict> {
    loop {
        print!("{rule} [y/s/n] ");
        io::stdout().flush().context("flush prompt")?;

        let mut input = String::new();
        io::stdin().read_line(&mut input).context("read verdict")?;

        match input.trim() {
            "y" => return Ok(Verdict::Pass),
            "n" => return Ok(Verdict::Fail),
            "s" | "" => return Ok(Verdict::Skip),
            _ => console::log("y = pass, s = skip (N/A), n = fail"),
        }
    }
}

fn render_summary(results: &[(String, Vec<(String, Verdict)>)]) -> String {
    let mut out = String::new();
    for (heading, rules) in results {
        out.push_str(&format!("**{heading}**\n"));
        for (rule, verdict) in rules {
            out.push_str(&format!("{}{rule}\n", verdict.mark()));
        }
        out.push('\n');
    }
    out.push_str("\n[[ https://github.com/mozilla/nss-tools | nsst review ]]\n");
    out
}
