//! Plugin value type and discovery kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// Discovery kind: which scanning strategy produced a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// HTTP server directives declared in the framework source.
    Http,
    /// DNS provider packages laid out as sibling directories.
    Dns,
}

impl PluginKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 2] = [Self::Http, Self::Dns];

    /// The lowercase tag for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Dns => "dns",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginKind {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PluginError::UnknownKind(s.to_string()))
    }
}

/// A discovered plugin.
///
/// Plain value: two plugins are the same plugin when all fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Plugin {
    name: String,
    package: String,
    #[serde(rename = "type")]
    kind: PluginKind,
}

impl Plugin {
    /// Create a plugin, rejecting empty names and packages.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidPlugin`] if `name` or `package` is empty.
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        kind: PluginKind,
    ) -> PluginResult<Self> {
        let name = name.into();
        let package = package.into();
        if name.is_empty() {
            return Err(PluginError::InvalidPlugin(format!(
                "{kind} plugin name must not be empty"
            )));
        }
        if package.is_empty() {
            return Err(PluginError::InvalidPlugin(format!(
                "package for {kind} plugin '{name}' must not be empty"
            )));
        }
        Ok(Self {
            name,
            package,
            kind,
        })
    }

    /// Directive string or provider directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Import or reference path.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Discovery kind.
    #[must_use]
    pub fn kind(&self) -> PluginKind {
        self.kind
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.name, self.package, self.kind)
    }
}
