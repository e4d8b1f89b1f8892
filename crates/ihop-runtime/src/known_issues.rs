use std::path::Path;

use anyhow::{bail, Context, Result};
use ihop_protocol::{SkipReason, TestCase};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
/// Cases and tests the backend is known to get wrong, loaded from TOML.
pub struct KnownIssues {
    #[serde(default, rename = "skip")]
    pub rules: Vec<SkipRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkipRule {
    /// Exact `case.description` this rule applies to.
    pub case: String,
    #[serde(default)]
    pub dialect: Option<String>,
    /// Exact test description; without one the whole case is skipped.
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub issue_url: Option<String>,
}

impl SkipRule {
    fn reason(&self) -> SkipReason {
        SkipReason {
            message: self.message.clone(),
            issue_url: self.issue_url.clone(),
        }
    }

    fn applies_to(&self, case: &TestCase, dialect: Option<&str>) -> bool {
        if case.description.as_deref() != Some(self.case.as_str()) {
            return false;
        }
        match self.dialect.as_deref() {
            Some(required) => dialect == Some(required),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the harness should do with one incoming case.
pub enum CasePlan {
    SkipCase(SkipReason),
    /// Aligned with `case.tests`; `Some` marks a skipped test.
    Run { skipped_tests: Vec<Option<SkipReason>> },
}

impl KnownIssues {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn plan(&self, case: &TestCase, dialect: Option<&str>) -> CasePlan {
        let matching = self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(case, dialect))
            .collect::<Vec<_>>();

        if let Some(rule) = matching.iter().find(|rule| rule.test.is_none()) {
            return CasePlan::SkipCase(rule.reason());
        }

        let skipped_tests = case
            .tests
            .iter()
            .map(|test| {
                let description = test.description.as_deref()?;
                matching
                    .iter()
                    .find(|rule| rule.test.as_deref() == Some(description))
                    .map(|rule| rule.reason())
            })
            .collect();
        CasePlan::Run { skipped_tests }
    }
}

pub fn parse_known_issues(raw: &str) -> Result<KnownIssues> {
    let issues =
        toml::from_str::<KnownIssues>(raw).context("failed to parse known issues TOML")?;
    validate_known_issues(&issues)?;
    Ok(issues)
}

pub fn load_known_issues(path: &Path) -> Result<KnownIssues> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read known issues file {}", path.display()))?;
    parse_known_issues(&raw)
        .with_context(|| format!("invalid known issues file {}", path.display()))
}

pub fn validate_known_issues(issues: &KnownIssues) -> Result<()> {
    for (index, rule) in issues.rules.iter().enumerate() {
        if rule.case.trim().is_empty() {
            bail!("skip rule {} has an empty case description", index);
        }
        if rule.test.as_deref().is_some_and(|test| test.trim().is_empty()) {
            bail!("skip rule {} has an empty test description", index);
        }
        if rule
            .dialect
            .as_deref()
            .is_some_and(|dialect| dialect.trim().is_empty())
        {
            bail!("skip rule {} has an empty dialect", index);
        }
    }
    Ok(())
}
