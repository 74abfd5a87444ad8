use serde::{Deserialize, Serialize};

/// A parsed scenario: ordered steps plus metadata. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default, alias = "defaultTimeout")]
    pub default_timeout_ms: Option<u64>,

    #[serde(default)]
    pub settle_delay_ms: Option<u64>,

    /// Overall budget. Reported in results, not enforced mid-run.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// All supported scenario steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[serde(alias = "goto")]
    Navigate(NavigateParams),
    WaitForLoad(WaitForLoadParams),
    #[serde(alias = "sleep")]
    Wait(WaitParams),
    #[serde(alias = "tap")]
    Click(TargetParams),
    #[serde(alias = "write")]
    Fill(FillParams),
    #[serde(alias = "scrollTo")]
    Scroll(TargetParams),
    #[serde(alias = "see")]
    AssertVisible(AssertParams),
}

impl Step {
    /// Locator fields of element-targeting steps
    pub fn target(&self) -> Option<&TargetParams> {
        match self {
            Step::Click(p) | Step::Scroll(p) => Some(p),
            Step::Fill(p) => Some(&p.target),
            Step::AssertVisible(p) => Some(&p.target),
            _ => None,
        }
    }

    /// Short human label used in events and reports
    pub fn label(&self) -> String {
        let locator = |t: &TargetParams| {
            t.locator()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "<no locator>".to_string())
        };
        match self {
            Step::Navigate(p) => format!("navigate {}", p.url),
            Step::WaitForLoad(p) => format!("waitForLoad {}", p.condition),
            Step::Wait(p) => format!("wait {}ms", p.ms()),
            Step::Click(p) => format!("click {}", locator(p)),
            Step::Fill(p) => format!("fill {}", locator(&p.target)),
            Step::Scroll(p) => format!("scroll {}", locator(p)),
            Step::AssertVisible(p) => format!("assertVisible {}", locator(&p.target)),
        }
    }
}

/// Parameters for the navigate step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
    pub url: String,

    #[serde(default)]
    pub wait_until: WaitUntil,

    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,
}

/// How far a navigation waits before the step is considered done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WaitUntil {
    /// Earliest safe point. The target page may hold long-lived
    /// connections that never finish loading.
    #[default]
    Commit,
    DomContentLoaded,
    Load,
}

/// Parameters for the waitForLoad step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForLoadParams {
    #[serde(default)]
    pub target: LoadTarget,

    #[serde(default)]
    pub condition: LoadCondition,

    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,
}

/// Which frames a waitForLoad step synchronizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadTarget {
    Scope(FrameScope),
    /// Child frame index in document order
    Child(usize),
}

impl Default for LoadTarget {
    fn default() -> Self {
        LoadTarget::Scope(FrameScope::AllFrames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameScope {
    Main,
    AllFrames,
}

/// Load condition a frame must reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LoadCondition {
    #[default]
    DomContentLoaded,
    Load,
}

impl std::fmt::Display for LoadCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadCondition::DomContentLoaded => write!(f, "domContentLoaded"),
            LoadCondition::Load => write!(f, "load"),
        }
    }
}

/// Parameters for the wait step: a plain pause, written as a bare number
/// of milliseconds or as `{ms: n}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WaitParams {
    Millis(u64),
    Struct { ms: u64 },
}

impl WaitParams {
    pub fn ms(&self) -> u64 {
        match self {
            WaitParams::Millis(n) => *n,
            WaitParams::Struct { ms } => *ms,
        }
    }
}

/// Locator fields shared by element-targeting steps. Exactly one strategy
/// field is expected; the first present wins in the order text, css,
/// xpath, id, placeholder, role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetParams {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub css: Option<String>,

    #[serde(default)]
    pub xpath: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// 0-based pick among matches
    #[serde(default)]
    pub index: Option<usize>,

    /// Child frame index. Absent targets the main frame.
    #[serde(default)]
    pub frame: Option<usize>,

    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,
}

impl TargetParams {
    /// Build the locator from whichever strategy field is present
    pub fn locator(&self) -> Option<LocatorRef> {
        let strategy = if let Some(t) = &self.text {
            Strategy::Text(t.clone())
        } else if let Some(c) = &self.css {
            Strategy::Css(c.clone())
        } else if let Some(x) = &self.xpath {
            Strategy::XPath(x.clone())
        } else if let Some(i) = &self.id {
            Strategy::Id(i.clone())
        } else if let Some(p) = &self.placeholder {
            Strategy::Placeholder(p.clone())
        } else if let Some(r) = &self.role {
            Strategy::Role(r.clone())
        } else {
            return None;
        };

        Some(LocatorRef {
            strategy,
            index: self.index.unwrap_or(0),
            frame: self.frame,
        })
    }
}

/// Parameters for the fill step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillParams {
    #[serde(flatten)]
    pub target: TargetParams,

    pub value: String,
}

/// Parameters for the assertVisible step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertParams {
    #[serde(flatten)]
    pub target: TargetParams,

    /// Diagnostic reported when the assertion times out
    #[serde(default)]
    pub message: Option<String>,
}

/// Declarative description of how to find an element. Value object with
/// no ownership of runtime resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRef {
    pub strategy: Strategy,
    pub index: usize,
    pub frame: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Text(String),
    Css(String),
    XPath(String),
    Id(String),
    Placeholder(String),
    Role(String),
}

impl std::fmt::Display for LocatorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.strategy {
            Strategy::Text(t) => write!(f, "text \"{}\"", t)?,
            Strategy::Css(c) => write!(f, "css \"{}\"", c)?,
            Strategy::XPath(x) => write!(f, "xpath \"{}\"", x)?,
            Strategy::Id(i) => write!(f, "id \"{}\"", i)?,
            Strategy::Placeholder(p) => write!(f, "placeholder \"{}\"", p)?,
            Strategy::Role(r) => write!(f, "role \"{}\"", r)?,
        }
        if self.index > 0 {
            write!(f, " [{}]", self.index)?;
        }
        if let Some(frame) = self.frame {
            write!(f, " (frame {})", frame)?;
        }
        Ok(())
    }
}
