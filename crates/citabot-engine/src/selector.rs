use std::fmt;

/// Lookup method for a selector candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum By {
    Id,
    Css,
    XPath,
    /// Exact trimmed text content of an interactive element.
    Text,
}

impl By {
    pub fn as_str(&self) -> &'static str {
        match self {
            By::Id => "id",
            By::Css => "css",
            By::XPath => "xpath",
            By::Text => "text",
        }
    }
}

/// What state the matched element must be in before the candidate counts as
/// satisfied. Mirrors the presence/visibility/clickability wait conditions of
/// classic driver APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Attached to the document, visibility irrelevant.
    Presence,
    #[default]
    Visible,
    /// Visible and not disabled.
    Clickable,
}

/// One (lookup method, target expression) pair in a resolution cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub by: By,
    pub expr: String,
    pub wait: WaitMode,
}

impl Selector {
    pub fn new(by: By, expr: impl Into<String>) -> Self {
        Self {
            by,
            expr: expr.into(),
            wait: WaitMode::default(),
        }
    }

    pub fn id(expr: impl Into<String>) -> Self {
        Self::new(By::Id, expr)
    }

    pub fn css(expr: impl Into<String>) -> Self {
        Self::new(By::Css, expr)
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(By::XPath, expr)
    }

    pub fn text(expr: impl Into<String>) -> Self {
        Self::new(By::Text, expr)
    }

    pub fn presence(mut self) -> Self {
        self.wait = WaitMode::Presence;
        self
    }

    pub fn clickable(mut self) -> Self {
        self.wait = WaitMode::Clickable;
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by.as_str(), self.expr)
    }
}
