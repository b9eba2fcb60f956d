//! HTTP directive discovery from the framework's Go source.
//!
//! The framework registers its server directives as a string slice:
//!
//! ```go
//! var directives = []string{
//! 	"realip", // github.com/captncraig/caddy-realip
//! 	"git",    // github.com/abiosoft/caddy-git
//! 	"root",
//! 	"proxy", // built-in reverse proxy
//! }
//! ```
//!
//! Each element whose adjacent comment is exactly one word is promoted to a
//! plugin, with the comment as its package path. `root` (no comment) and
//! `proxy` (a prose comment) are not plugins.

mod comments;
mod literal;
mod syntax;

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{PluginError, PluginResult};
use crate::fetcher::PluginFetcher;
use crate::plugin::{Plugin, PluginKind};

use comments::CommentMap;

/// Name of the declaration holding the directive list.
pub const DEFAULT_DECLARATION: &str = "directives";

/// Scans a Go source file for directive plugins.
#[derive(Debug, Clone)]
pub struct DirectiveScanner {
    path: PathBuf,
    declaration: String,
}

impl DirectiveScanner {
    /// Scanner for the `directives` declaration in `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declaration: DEFAULT_DECLARATION.to_string(),
        }
    }

    /// Look up a different top-level declaration.
    #[must_use]
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = declaration.into();
        self
    }

    /// Source file this scanner reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and scan the source file.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the file cannot be read, and the
    /// errors of [`scan_directives`] otherwise.
    pub fn scan(&self) -> PluginResult<Vec<Plugin>> {
        let source =
            std::fs::read_to_string(&self.path).map_err(|e| PluginError::io(&self.path, e))?;
        let plugins = scan_directives(&self.path, &source, &self.declaration)?;
        debug!(
            path = %self.path.display(),
            count = plugins.len(),
            "Scanned directive plugins"
        );
        Ok(plugins)
    }
}

impl PluginFetcher for DirectiveScanner {
    fn kind(&self) -> PluginKind {
        PluginKind::Http
    }

    fn fetch_plugins(&self) -> PluginResult<Vec<Plugin>> {
        self.scan()
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.declaration)
    }
}

/// Extract directive plugins from Go source text.
///
/// `path` is only used in error messages. Plugins are returned in the order
/// their elements appear in the literal.
///
/// # Errors
///
/// - [`PluginError::Syntax`] if the source does not parse.
/// - [`PluginError::Shape`] if `declaration` is missing, is not an array or
///   slice literal, or a commented element is not a basic literal.
/// - [`PluginError::Unquote`] if a commented element is not a valid quoted
///   string.
pub fn scan_directives(path: &Path, source: &str, declaration: &str) -> PluginResult<Vec<Plugin>> {
    let tree = syntax::parse(path, source)?;
    let root = tree.root_node();
    let elements = syntax::directive_elements(root, source.as_bytes(), declaration)?;
    let comments = CommentMap::new(root, source.as_bytes());

    let mut plugins = Vec::new();
    for element in elements {
        let Some(group) = comments.first(element) else {
            continue;
        };
        let text = group.text();
        let package = text.trim();
        let directive = syntax::directive_name(element, source.as_bytes())?;

        let mut words = package.split_whitespace();
        let (Some(token), None) = (words.next(), words.next()) else {
            trace!(directive, comment = package, "Comment is not a package path");
            continue;
        };
        if directive.is_empty() {
            warn!(package = token, "Skipping directive with empty name");
            continue;
        }
        plugins.push(Plugin::new(directive, token, PluginKind::Http)?);
    }
    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGIN_GO: &str = r#"package httpserver

import "fmt"

// directives is the list of all directives known to exist for the
// http server type, including non-standard (3rd-party) directives.
// The ordering of this list is important.
var directives = []string{
	// primitive actions that set up the fundamental
	// setup of the site and its listener
	"bind",
	"limits",
	"timeouts",
	"tls",

	// services/utilities, or other directives that
	// don't necessarily inject handlers
	"startup",  // TODO: Deprecate this directive
	"shutdown", // TODO: Deprecate this directive
	"realip",   // github.com/captncraig/caddy-realip
	"git",      // github.com/abiosoft/caddy-git

	// directives that add middleware to the stack
	"locale", // github.com/simia-tech/caddy-locale
	"log",
	"cache",    // github.com/nicolasazrak/caddy-cache
	"jwt",      // github.com/BTBurke/caddy-jwt
	"jsonp",    // github.com/pschlump/caddy-jsonp
	"upload",   // blitznote.com/src/caddy.upload
	"proxy",
}

func main() { fmt.Println(directives) }
"#;

    fn scan(src: &str) -> PluginResult<Vec<Plugin>> {
        scan_directives(Path::new("plugin.go"), src, DEFAULT_DECLARATION)
    }

    fn http(name: &str, package: &str) -> Plugin {
        Plugin::new(name, package, PluginKind::Http).unwrap()
    }

    #[test]
    fn promotes_single_token_comments_in_order() {
        let plugins = scan(PLUGIN_GO).unwrap();
        assert_eq!(
            plugins,
            vec![
                http("realip", "github.com/captncraig/caddy-realip"),
                http("git", "github.com/abiosoft/caddy-git"),
                http("locale", "github.com/simia-tech/caddy-locale"),
                http("cache", "github.com/nicolasazrak/caddy-cache"),
                http("jwt", "github.com/BTBurke/caddy-jwt"),
                http("jsonp", "github.com/pschlump/caddy-jsonp"),
                http("upload", "blitznote.com/src/caddy.upload"),
            ]
        );
    }

    #[test]
    fn comment_is_trimmed() {
        let src = "package p\n\nvar directives = []string{\n\t\"foo.Plugin\", //   github.com/x/foo  \n}\n";
        assert_eq!(
            scan(src).unwrap(),
            vec![http("foo.Plugin", "github.com/x/foo")]
        );
    }

    #[test]
    fn leading_comment_attaches_to_next_element() {
        let src = "package p\n\nvar directives = []string{\n\t\"root\",\n\t// github.com/x/gzip\n\t\"gzip\",\n}\n";
        assert_eq!(scan(src).unwrap(), vec![http("gzip", "github.com/x/gzip")]);
    }

    #[test]
    fn empty_literal_is_valid() {
        let src = "package p\n\nvar directives = []string{}\n";
        assert!(scan(src).unwrap().is_empty());
    }

    #[test]
    fn uncommented_elements_are_not_decoded() {
        let src = "package p\n\nvar directives = []string{\n\tname,\n\t\"git\", // github.com/abiosoft/caddy-git\n}\n";
        assert_eq!(
            scan(src).unwrap(),
            vec![http("git", "github.com/abiosoft/caddy-git")]
        );
    }

    #[test]
    fn commented_non_string_element_fails() {
        let src = "package p\n\nvar directives = []string{\n\t42, // github.com/x/answer\n}\n";
        assert!(matches!(
            scan(src).unwrap_err(),
            PluginError::Unquote { .. }
        ));
    }

    #[test]
    fn map_declaration_yields_no_plugins() {
        let src = "package p\n\nvar directives = map[string]string{\n\t\"git\": \"x\", // github.com/abiosoft/caddy-git\n}\n";
        assert!(matches!(scan(src).unwrap_err(), PluginError::Shape { .. }));
    }

    #[test]
    fn missing_declaration_is_a_shape_error() {
        let src = "package p\n\nvar plugins = []string{\"a\"}\n";
        assert!(matches!(scan(src).unwrap_err(), PluginError::Shape { .. }));
    }

    #[test]
    fn custom_declaration_name() {
        let src = "package p\n\nvar handlers = []string{\n\t\"git\", // github.com/abiosoft/caddy-git\n}\n";
        let plugins = scan_directives(Path::new("p.go"), src, "handlers").unwrap();
        assert_eq!(plugins.len(), 1);
    }

    #[test]
    fn scanner_reads_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.go");
        std::fs::write(&path, PLUGIN_GO).unwrap();

        let scanner = DirectiveScanner::new(&path);
        let first = scanner.fetch_plugins().unwrap();
        let second = scanner.fetch_plugins().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let scanner = DirectiveScanner::new("/nonexistent/plugin.go");
        assert!(matches!(scanner.scan().unwrap_err(), PluginError::Io { .. }));
    }
}
