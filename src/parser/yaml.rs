use super::types::{Scenario, Step};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Parse a YAML scenario file
pub fn parse_scenario_file(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

    parse_yaml_content(&content).with_context(|| format!("In scenario: {}", path.display()))
}

/// Parse YAML content into a Scenario and validate it
pub fn parse_yaml_content(content: &str) -> Result<Scenario> {
    let scenario: Scenario =
        serde_yaml::from_str(content).context("Failed to parse scenario YAML")?;
    validate(&scenario)?;
    Ok(scenario)
}

fn validate(scenario: &Scenario) -> Result<()> {
    if scenario.name.trim().is_empty() {
        bail!("Scenario name must not be empty");
    }
    if scenario.steps.is_empty() {
        bail!("Scenario '{}' has no steps", scenario.name);
    }
    for (index, step) in scenario.steps.iter().enumerate() {
        if let Some(target) = step.target() {
            if target.locator().is_none() {
                bail!(
                    "Step {} of '{}' needs a locator (text, css, xpath, id, placeholder or role)",
                    index,
                    scenario.name
                );
            }
        }
        if let Step::Navigate(p) = step {
            if p.url.trim().is_empty() {
                bail!("Step {} of '{}' has an empty url", index, scenario.name);
            }
        }
    }
    Ok(())
}

/// Collect scenario files from a path. Directories are walked recursively
/// for .yaml/.yml files, sorted for a stable execution order.
pub fn collect_scenario_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Path not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::{FrameScope, LoadCondition, LoadTarget, Strategy, WaitUntil};

    #[test]
    fn test_parse_full_scenario() {
        let yaml = r#"
name: Admin login rejects bad credentials
baseUrl: http://localhost:3000
defaultTimeoutMs: 5000
settleDelayMs: 0
tags: [admin, auth]
steps:
  - navigate:
      url: /admin
      waitUntil: commit
      timeoutMs: 10000
  - waitForLoad:
      target: allFrames
      condition: domContentLoaded
      timeoutMs: 3000
  - click:
      text: Login
  - fill:
      css: "input[name='username']"
      value: baduser
  - fill:
      placeholder: Password
      value: wrong
  - click:
      role: button
      index: 1
  - assertVisible:
      text: Admin Dashboard Loaded Successfully
      timeoutMs: 1000
      message: Login with bad credentials should not reach the dashboard
"#;

        let scenario = parse_yaml_content(yaml).unwrap();
        assert_eq!(scenario.name, "Admin login rejects bad credentials");
        assert_eq!(scenario.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(scenario.default_timeout_ms, Some(5000));
        assert_eq!(scenario.settle_delay_ms, Some(0));
        assert_eq!(scenario.tags, vec!["admin", "auth"]);
        assert_eq!(scenario.steps.len(), 7);

        match &scenario.steps[0] {
            Step::Navigate(p) => {
                assert_eq!(p.url, "/admin");
                assert_eq!(p.wait_until, WaitUntil::Commit);
                assert_eq!(p.timeout_ms, Some(10000));
            }
            other => panic!("expected navigate, got {:?}", other),
        }

        match &scenario.steps[1] {
            Step::WaitForLoad(p) => {
                assert_eq!(p.target, LoadTarget::Scope(FrameScope::AllFrames));
                assert_eq!(p.condition, LoadCondition::DomContentLoaded);
            }
            other => panic!("expected waitForLoad, got {:?}", other),
        }

        match &scenario.steps[5] {
            Step::Click(p) => {
                let locator = p.locator().unwrap();
                assert_eq!(locator.strategy, Strategy::Role("button".to_string()));
                assert_eq!(locator.index, 1);
            }
            other => panic!("expected click, got {:?}", other),
        }

        match &scenario.steps[6] {
            Step::AssertVisible(p) => {
                assert_eq!(
                    p.message.as_deref(),
                    Some("Login with bad credentials should not reach the dashboard")
                );
                assert_eq!(p.target.timeout_ms, Some(1000));
            }
            other => panic!("expected assertVisible, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let yaml = r#"
name: Smoke
steps:
  - navigate:
      url: /
  - assertVisible:
      text: Login
"#;

        let scenario = parse_yaml_content(yaml).unwrap();
        assert_eq!(scenario.base_url, None);
        match &scenario.steps[0] {
            Step::Navigate(p) => {
                assert_eq!(p.wait_until, WaitUntil::Commit);
                assert_eq!(p.timeout_ms, None);
            }
            other => panic!("expected navigate, got {:?}", other),
        }
        match &scenario.steps[1] {
            Step::AssertVisible(p) => {
                let locator = p.target.locator().unwrap();
                assert_eq!(locator.index, 0);
                assert_eq!(locator.frame, None);
            }
            other => panic!("expected assertVisible, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_frame_index_target() {
        let yaml = r#"
name: Frame sync
steps:
  - navigate:
      url: /dashboard
  - waitForLoad:
      target: 1
      condition: load
      timeoutMs: 2000
  - click:
      text: Refresh
      frame: 1
"#;

        let scenario = parse_yaml_content(yaml).unwrap();
        match &scenario.steps[1] {
            Step::WaitForLoad(p) => {
                assert_eq!(p.target, LoadTarget::Child(1));
                assert_eq!(p.condition, LoadCondition::Load);
            }
            other => panic!("expected waitForLoad, got {:?}", other),
        }
        match &scenario.steps[2] {
            Step::Click(p) => {
                assert_eq!(p.locator().unwrap().frame, Some(1));
            }
            other => panic!("expected click, got {:?}", other),
        }
    }

    #[test]
    fn test_step_aliases() {
        let yaml = r#"
name: Aliases
steps:
  - goto:
      url: /
  - tap:
      text: Start
  - sleep: 2000
  - see:
      text: Done
"#;

        let scenario = parse_yaml_content(yaml).unwrap();
        assert!(matches!(scenario.steps[0], Step::Navigate(_)));
        assert!(matches!(scenario.steps[1], Step::Click(_)));
        assert!(matches!(scenario.steps[2], Step::Wait(_)));
        assert!(matches!(scenario.steps[3], Step::AssertVisible(_)));
    }

    #[test]
    fn test_wait_step_forms() {
        let yaml = r#"
name: Waits
steps:
  - wait: 1500
  - wait:
      ms: 250
"#;

        let scenario = parse_yaml_content(yaml).unwrap();
        match &scenario.steps[0] {
            Step::Wait(p) => assert_eq!(p.ms(), 1500),
            other => panic!("expected wait, got {:?}", other),
        }
        match &scenario.steps[1] {
            Step::Wait(p) => assert_eq!(p.ms(), 250),
            other => panic!("expected wait, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_locator_is_rejected() {
        let yaml = r#"
name: Broken
steps:
  - click:
      index: 2
"#;

        let err = parse_yaml_content(yaml).unwrap_err();
        assert!(err.to_string().contains("needs a locator"));
    }

    #[test]
    fn test_empty_steps_rejected() {
        let yaml = "name: Empty\nsteps: []\n";
        let err = parse_yaml_content(yaml).unwrap_err();
        assert!(err.to_string().contains("no steps"));
    }
}
