//! # Route Table
//!
//! Declarative list of `(path pattern, access class, view target)` entries
//! plus the matching algorithm.
//!
//! ## Matching Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       match_path("/product/42/")                        │
//! │                                                                         │
//! │  1. Normalize ─────────► drop ?query / #fragment                        │
//! │                          collapse "//", strip trailing "/"              │
//! │                          "/product/42"                                  │
//! │                                                                         │
//! │  2. Exact literals ────► "/", "/products", "/cart", ...   (no match)    │
//! │                                                                         │
//! │  3. One named segment ─► "/product/:id"                   MATCH id=42   │
//! │                                                                         │
//! │  4. Wildcard ──────────► "*" (NotFound) only if nothing above matched   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table always has a wildcard entry, so `match_path` is total. Segment
//! values are handed to the view untouched; the table never checks that a
//! product id exists.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::{ConfigurationError, CoreResult};
use crate::types::{AccessClass, RedirectTargets, ViewId, ViewTarget};
use crate::validation::{validate_literal_segment, validate_redirect_path, validate_segment_name};

// =============================================================================
// Path Normalization
// =============================================================================

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Normalizes a concrete path for matching.
///
/// ## Example
/// ```rust
/// use storefront_core::route::normalize_path;
///
/// assert_eq!(normalize_path("/cart/"), "/cart");
/// assert_eq!(normalize_path("//product//42?ref=home"), "/product/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = split_segments(path).collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

// =============================================================================
// Path Pattern
// =============================================================================

/// How specific a pattern is. Lower sorts first and wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    Exact,
    Parameterized,
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern: `/products`, `/product/:id` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    wildcard: bool,
}

impl PathPattern {
    /// The catch-all pattern.
    pub const WILDCARD: &'static str = "*";

    /// Parses a declared pattern.
    ///
    /// ## Rules
    /// - `*` alone is the catch-all
    /// - Otherwise must start with `/` and carry no query or fragment
    /// - At most one named segment (`:name`)
    /// - Literal segments use unreserved characters only
    pub fn parse(pattern: &str) -> CoreResult<Self> {
        let malformed = |reason: String| ConfigurationError::MalformedPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern == Self::WILDCARD {
            return Ok(PathPattern {
                source: Self::WILDCARD.to_string(),
                segments: Vec::new(),
                wildcard: true,
            });
        }

        if !pattern.starts_with('/') {
            return Err(malformed("must start with '/'".to_string()));
        }

        if pattern.contains(['?', '#']) {
            return Err(malformed("must not contain a query or fragment".to_string()));
        }

        let source = normalize_path(pattern);
        let mut segments = Vec::new();

        for raw in split_segments(&source) {
            if raw.contains('*') {
                return Err(malformed(
                    "wildcard is only allowed as the whole pattern".to_string(),
                ));
            }

            match raw.strip_prefix(':') {
                Some(name) => {
                    validate_segment_name(name).map_err(|e| malformed(e.to_string()))?;
                    segments.push(Segment::Param(name.to_string()));
                }
                None => {
                    validate_literal_segment(raw).map_err(|e| malformed(e.to_string()))?;
                    segments.push(Segment::Literal(raw.to_string()));
                }
            }
        }

        let named = segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count();
        if named > 1 {
            return Err(malformed(
                "at most one named segment is supported".to_string(),
            ));
        }

        Ok(PathPattern {
            source,
            segments,
            wildcard: false,
        })
    }

    /// The normalized pattern text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn specificity(&self) -> Specificity {
        if self.wildcard {
            Specificity::Wildcard
        } else if self.segments.iter().any(|s| matches!(s, Segment::Param(_))) {
            Specificity::Parameterized
        } else {
            Specificity::Exact
        }
    }

    /// Shape of the pattern with segment names erased, for duplicate checks.
    fn shape(&self) -> String {
        if self.wildcard {
            return Self::WILDCARD.to_string();
        }

        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Param(_) => ":",
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Matches an already-normalized path, extracting named segments.
    fn matches(&self, normalized: &str) -> Option<RouteParams> {
        if self.wildcard {
            return Some(RouteParams::default());
        }

        let parts: Vec<&str> = split_segments(normalized).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name, part),
            }
        }

        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// Route Params
// =============================================================================

/// Named segment values extracted from a concrete path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// Route Entry
// =============================================================================

/// One row of the route table.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    name: String,
    pattern: PathPattern,
    access: AccessClass,
    target: ViewTarget,
}

impl RouteEntry {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        access: AccessClass,
        target: ViewTarget,
    ) -> CoreResult<Self> {
        Ok(RouteEntry {
            name: name.into(),
            pattern: PathPattern::parse(pattern)?,
            access,
            target,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[inline]
    pub fn access(&self) -> AccessClass {
        self.access
    }

    #[inline]
    pub fn target(&self) -> &ViewTarget {
        &self.target
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.pattern.is_wildcard()
    }
}

/// The entry selected for a concrete path.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: RouteParams,
    /// Normalized path used for matching.
    pub path: String,
    /// The path exactly as requested, query string included.
    pub requested: String,
}

// =============================================================================
// Route Table
// =============================================================================

/// Immutable route table, ordered by specificity.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    fallback: usize,
}

impl RouteTable {
    /// Builds a table from declared entries.
    ///
    /// ## Errors
    /// - `DuplicateRoute` if two patterns normalize to the same shape
    /// - `MissingFallback` if no `*` entry is declared
    pub fn new(mut entries: Vec<RouteEntry>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.pattern.shape()) {
                return Err(ConfigurationError::DuplicateRoute {
                    pattern: entry.pattern.as_str().to_string(),
                });
            }
        }

        // Stable: declaration order breaks ties within a specificity level.
        entries.sort_by_key(|entry| entry.pattern.specificity());

        let fallback = entries
            .iter()
            .position(RouteEntry::is_fallback)
            .ok_or(ConfigurationError::MissingFallback)?;

        Ok(RouteTable { entries, fallback })
    }

    /// Selects exactly one entry for `path`. Never fails.
    pub fn match_path(&self, path: &str) -> RouteMatch<'_> {
        let normalized = normalize_path(path);

        let (entry, params) = self
            .entries
            .iter()
            .find_map(|entry| entry.pattern.matches(&normalized).map(|p| (entry, p)))
            .unwrap_or_else(|| (self.fallback(), RouteParams::default()));

        RouteMatch {
            entry,
            params,
            path: normalized,
            requested: path.to_string(),
        }
    }

    /// The wildcard NotFound entry.
    pub fn fallback(&self) -> &RouteEntry {
        &self.entries[self.fallback]
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Every view referenced by the table, deduplicated, in table order.
    pub fn views(&self) -> Vec<&ViewId> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|entry| entry.target.views())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Checks that both redirect targets render for the viewer sent there.
    ///
    /// ```text
    /// sign-in target  ← anonymous viewers  → must not be Private
    /// landing target  ← signed-in viewers  → must not be AuthOnly
    /// neither may fall through to the wildcard
    /// ```
    ///
    /// With this holding, a redirect always lands on a route that renders,
    /// so the guard can never produce a redirect cycle.
    pub fn validate_redirects(&self, targets: &RedirectTargets) -> CoreResult<()> {
        let checks = [
            (&targets.sign_in, AccessClass::Private, "anonymous viewers"),
            (&targets.landing, AccessClass::AuthOnly, "signed-in viewers"),
        ];

        for (path, forbidden, audience) in checks {
            validate_redirect_path(path)?;

            let matched = self.match_path(path);
            if matched.entry.is_fallback() {
                return Err(ConfigurationError::InvalidRedirectTarget {
                    path: path.clone(),
                    reason: "does not match a declared route".to_string(),
                });
            }

            if matched.entry.access == forbidden {
                return Err(ConfigurationError::InvalidRedirectTarget {
                    path: path.clone(),
                    reason: format!("{} route cannot render for {}", forbidden, audience),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str) -> ViewTarget {
        ViewTarget::Page(ViewId::new(id))
    }

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteEntry::new("not-found", "*", AccessClass::Public, page("not-found")).unwrap(),
            RouteEntry::new("detail", "/product/:id", AccessClass::Public, page("detail")).unwrap(),
            RouteEntry::new("home", "/", AccessClass::Public, page("home")).unwrap(),
            RouteEntry::new("new", "/product/new", AccessClass::Private, page("new")).unwrap(),
            RouteEntry::new("login", "/login", AccessClass::AuthOnly, page("login")).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/cart/"), "/cart");
        assert_eq!(normalize_path("cart"), "/cart");
        assert_eq!(normalize_path("/a//b///"), "/a/b");
        assert_eq!(normalize_path("/search?q=shoes#results"), "/search");
    }

    #[test]
    fn test_parse_rejects_malformed_patterns() {
        for bad in ["cart", "/a/*", "/a/:", "/:a/:b", "/cart?x=1", "/a b"] {
            let err = PathPattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::MalformedPattern { .. }),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_specificity() {
        assert_eq!(PathPattern::parse("/").unwrap().specificity(), Specificity::Exact);
        assert_eq!(
            PathPattern::parse("/product/:id").unwrap().specificity(),
            Specificity::Parameterized
        );
        assert_eq!(PathPattern::parse("*").unwrap().specificity(), Specificity::Wildcard);
    }

    #[test]
    fn test_literal_beats_parameter() {
        let table = table();
        assert_eq!(table.match_path("/product/new").entry.name(), "new");

        let matched = table.match_path("/product/42/");
        assert_eq!(matched.entry.name(), "detail");
        assert_eq!(matched.params.get("id"), Some("42"));
        assert_eq!(matched.path, "/product/42");
        assert_eq!(matched.requested, "/product/42/");
    }

    #[test]
    fn test_unmatched_paths_fall_back() {
        let table = table();
        for path in ["/nope", "/product", "/product/1/reviews", "/login/extra"] {
            let matched = table.match_path(path);
            assert!(matched.entry.is_fallback(), "{} should fall back", path);
            assert!(matched.params.is_empty());
        }
    }

    #[test]
    fn test_segment_values_are_opaque() {
        let table = table();
        let matched = table.match_path("/product/not-a-real-id%20x");
        assert_eq!(matched.params.get("id"), Some("not-a-real-id%20x"));
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let err = RouteTable::new(vec![
            RouteEntry::new("a", "/cart", AccessClass::Public, page("a")).unwrap(),
            RouteEntry::new("b", "/cart/", AccessClass::Public, page("b")).unwrap(),
            RouteEntry::new("nf", "*", AccessClass::Public, page("nf")).unwrap(),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateRoute { .. }));

        let err = RouteTable::new(vec![
            RouteEntry::new("a", "/product/:id", AccessClass::Public, page("a")).unwrap(),
            RouteEntry::new("b", "/product/:sku", AccessClass::Public, page("b")).unwrap(),
            RouteEntry::new("nf", "*", AccessClass::Public, page("nf")).unwrap(),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_missing_fallback() {
        let err = RouteTable::new(vec![
            RouteEntry::new("a", "/", AccessClass::Public, page("a")).unwrap(),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingFallback));
    }

    #[test]
    fn test_validate_redirects() {
        let table = table();
        assert!(table.validate_redirects(&RedirectTargets::default()).is_ok());

        let private_sign_in = RedirectTargets {
            sign_in: "/product/new".to_string(),
            landing: "/".to_string(),
        };
        assert!(matches!(
            table.validate_redirects(&private_sign_in),
            Err(ConfigurationError::InvalidRedirectTarget { .. })
        ));

        let auth_only_landing = RedirectTargets {
            sign_in: "/login".to_string(),
            landing: "/login".to_string(),
        };
        assert!(table.validate_redirects(&auth_only_landing).is_err());

        let unrouted = RedirectTargets {
            sign_in: "/signin".to_string(),
            landing: "/".to_string(),
        };
        assert!(table.validate_redirects(&unrouted).is_err());
    }

    #[test]
    fn test_views_deduplicated() {
        let table = RouteTable::new(vec![
            RouteEntry::new("a", "/a", AccessClass::Public, page("list")).unwrap(),
            RouteEntry::new("b", "/b", AccessClass::Public, page("list")).unwrap(),
            RouteEntry::new("nf", "*", AccessClass::Public, page("nf")).unwrap(),
        ])
        .unwrap();
        assert_eq!(table.views().len(), 2);
    }
}
