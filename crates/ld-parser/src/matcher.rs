//! Path patterns that extract `locale` and `namespace` from file paths.
//!
//! A pattern such as `{locale}/{namespaces}.{ext}` is compiled once into an
//! anchored regex. Matching a path relative to a locale root yields a
//! [`PathMatch`] when the path fits and carries a non-empty locale.
//!
//! # Placeholders
//!
//! | Placeholder     | Matches                                         |
//! |-----------------|-------------------------------------------------|
//! | `{locale}`      | one or more of `[A-Za-z0-9_-]`                  |
//! | `{locale?}`     | zero or more of the same, lazily                |
//! | `{namespace}`   | one path segment                                |
//! | `{namespace?}`  | part of one path segment, possibly empty        |
//! | `{namespaces}`  | one or more characters, may span segments       |
//! | `{namespaces?}` | zero or more characters, may span segments      |
//! | `{ext}`         | one of the registered extension alternations    |
//! | `*`             | any run of characters                           |
//!
//! Everything else matches literally.

use regex::Regex;
use tracing::trace;

use crate::error::ParseError;

const LOCALE_GROUP: &str = "locale";
const NAMESPACE_GROUP: &str = "namespace";
const EXT_GROUP: &str = "ext";

/// Fields extracted from a matching path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// The captured locale. Never empty.
    pub locale: String,
    /// The captured namespace with separators replaced by `.`, if non-empty.
    pub namespace: Option<String>,
    /// The captured extension, without the dot, if the pattern has `{ext}`.
    pub ext: Option<String>,
}

/// A compiled path pattern.
///
/// # Examples
///
/// ```
/// use ld_parser::PathMatcher;
///
/// let matcher = PathMatcher::compile("{locale}/{namespaces}.{ext}", "json|ya?ml").unwrap();
///
/// let m = matcher.matches("en/more/extra.json").unwrap();
/// assert_eq!(m.locale, "en");
/// assert_eq!(m.namespace.as_deref(), Some("more.extra"));
///
/// assert!(matcher.matches("en/common.txt").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    regex: Regex,
}

impl PathMatcher {
    /// Compiles `pattern`, substituting `extensions` for `{ext}`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPattern`] if the expanded regex does not
    /// compile, e.g. because `extensions` is not a valid alternation.
    pub fn compile(pattern: &str, extensions: &str) -> Result<Self, ParseError> {
        let source = expand(pattern, extensions);
        let regex = Regex::new(&source).map_err(|e| ParseError::invalid_pattern(source.clone(), e))?;
        trace!(pattern, regex = %regex, "Compiled path matcher");
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// Matches a path relative to a locale root.
    ///
    /// Backslashes are treated as path separators. Returns `None` if the path
    /// does not fit the pattern or the locale capture is missing or empty.
    #[must_use]
    pub fn matches(&self, relative: &str) -> Option<PathMatch> {
        let relative = relative.replace('\\', "/");
        let caps = self.regex.captures(&relative)?;

        let locale = caps.name(LOCALE_GROUP).map(|m| m.as_str())?;
        if locale.is_empty() {
            return None;
        }

        let namespace = caps
            .name(NAMESPACE_GROUP)
            .map(|m| m.as_str().replace(['/', '\\'], "."))
            .filter(|ns| !ns.is_empty());

        Some(PathMatch {
            locale: locale.to_owned(),
            namespace,
            ext: caps.name(EXT_GROUP).map(|m| m.as_str().to_owned()),
        })
    }

    /// Returns the pattern this matcher was compiled from.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the compiled regex.
    #[inline]
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// An ordered list of path matchers. The first one that matches wins.
///
/// # Examples
///
/// ```
/// use ld_parser::PathMatchers;
///
/// let matchers = PathMatchers::compile(
///     ["{locale}/{namespaces}.{ext}", "{locale}.{ext}"],
///     "json",
/// ).unwrap();
///
/// let (matcher, m) = matchers.find("zh.json").unwrap();
/// assert_eq!(matcher.pattern(), "{locale}.{ext}");
/// assert_eq!(m.locale, "zh");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathMatchers {
    matchers: Vec<PathMatcher>,
}

impl PathMatchers {
    /// Compiles every pattern against the same extension alternation.
    pub fn compile<I, S>(patterns: I, extensions: &str) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = patterns
            .into_iter()
            .map(|p| PathMatcher::compile(p.as_ref(), extensions))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Returns the first matcher that matches `relative`, with its captures.
    #[must_use]
    pub fn find(&self, relative: &str) -> Option<(&PathMatcher, PathMatch)> {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.matches(relative).map(|m| (matcher, m)))
    }

    /// Returns the matchers in priority order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[PathMatcher] {
        &self.matchers
    }

    /// Returns `true` if no matcher is configured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Expands placeholders into an anchored regex source string.
///
/// Only the first occurrence of each placeholder kind becomes a named group;
/// repeats are matched without capturing.
fn expand(pattern: &str, extensions: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + extensions.len());
    let mut seen_locale = false;
    let mut seen_namespace = false;
    let mut seen_ext = false;
    out.push('^');

    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if ch == '*' {
            out.push_str(".*");
            rest = &rest[1..];
            continue;
        }

        if ch == '{' {
            if let Some(end) = rest.find('}') {
                let token = &rest[1..end];
                let body = match token {
                    "locale" => Some(r"[\w-]+"),
                    "locale?" => Some(r"[\w-]*?"),
                    "namespace" => Some(r"[^/\\]+"),
                    "namespace?" => Some(r"[^/\\]*?"),
                    "namespaces" => Some(r".+"),
                    "namespaces?" => Some(r".*?"),
                    "ext" => None,
                    _ => {
                        // Unknown placeholder: keep it literally.
                        out.push_str(&regex::escape(&rest[..=end]));
                        rest = &rest[end + 1..];
                        continue;
                    }
                };

                match (token, body) {
                    ("ext", _) => push_group(&mut out, EXT_GROUP, extensions, &mut seen_ext),
                    (t, Some(body)) if t.starts_with(LOCALE_GROUP) => {
                        push_group(&mut out, LOCALE_GROUP, body, &mut seen_locale);
                    }
                    (_, Some(body)) => push_group(&mut out, NAMESPACE_GROUP, body, &mut seen_namespace),
                    (_, None) => {}
                }
                rest = &rest[end + 1..];
                continue;
            }
        }

        let next = rest
            .find(['*', '{'])
            .filter(|&i| i > 0)
            .unwrap_or(rest.len());
        out.push_str(&regex::escape(&rest[..next]));
        rest = &rest[next..];
    }

    out.push('$');
    out
}

fn push_group(out: &mut String, name: &str, body: &str, seen: &mut bool) {
    if *seen {
        out.push_str("(?:");
    } else {
        out.push_str("(?P<");
        out.push_str(name);
        out.push('>');
        *seen = true;
    }
    out.push_str(body);
    out.push(')');
}
