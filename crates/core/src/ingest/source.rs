use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Remote,
    Local,
    Demo,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Remote => "remote",
            SourceKind::Local => "local",
            SourceKind::Demo => "demo",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSet {
    pub prefix: String,
}

impl PathSet {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn file(&self, name: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), name)
    }

    /// Parent-relative, current-relative and bare-relative `data/` directories, in that order.
    pub fn default_candidates() -> Vec<PathSet> {
        vec![
            PathSet::new("../data"),
            PathSet::new("./data"),
            PathSet::new("data"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Locator {
    Remote { base_url: String },
    Local { candidates: Vec<PathSet> },
    Demo,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Remote { base_url } => f.write_str(base_url),
            Locator::Local { candidates } => {
                let prefixes: Vec<&str> = candidates.iter().map(|c| c.prefix.as_str()).collect();
                write!(f, "[{}]", prefixes.join(", "))
            }
            Locator::Demo => f.write_str("embedded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub priority: u8,
    pub locator: Locator,
}
