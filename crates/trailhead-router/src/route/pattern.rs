//! Path pattern compilation
//!
//! Turns a declarative route path such as `/users/:id` into an anchored regex
//! plus the ordered list of placeholder names. Caller-supplied regexes pass
//! through unchanged and every capture they produce becomes a splat value.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::RouterError;

/// `:name` placeholder inside a path template
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+)").unwrap());

/// Single-segment capture a placeholder compiles to
const SEGMENT_CAPTURE: &str = r"([^./?]+)";

/// End anchor that tolerates a trailing `?query`
const QUERY_SUFFIX: &str = r"(?:\?.*)?$";

/// Declarative path specification accepted by route registration
///
/// # Examples
///
/// ```
/// use trailhead_router::PathSpec;
/// use regex::Regex;
///
/// let template: PathSpec = "/hello/:name".into();
/// assert!(matches!(template, PathSpec::Template(_)));
///
/// let raw: PathSpec = Regex::new(r"/(.*)").unwrap().into();
/// assert!(matches!(raw, PathSpec::Raw(_)));
/// ```
#[derive(Debug, Clone)]
pub enum PathSpec {
    /// Path template with zero or more `:name` placeholders
    Template(String),
    /// Pre-built regex used as-is
    Raw(Regex),
}

impl From<&str> for PathSpec {
    fn from(template: &str) -> Self {
        PathSpec::Template(template.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(template: String) -> Self {
        PathSpec::Template(template)
    }
}

impl From<Regex> for PathSpec {
    fn from(regex: Regex) -> Self {
        PathSpec::Raw(regex)
    }
}

impl From<&Regex> for PathSpec {
    fn from(regex: &Regex) -> Self {
        PathSpec::Raw(regex.clone())
    }
}

/// A matcher plus the placeholder names bound to its leading capture groups
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// The text the pattern was registered with (template or raw regex source)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in left-to-right order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Tests `path` against the pattern
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches `path` and returns every capture group in order, whole match excluded
    ///
    /// Groups that did not participate in the match are `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trailhead_router::compile;
    ///
    /// let pattern = compile("/hello/:name").unwrap();
    /// let captures = pattern.captures("/hello/world?lang=en").unwrap();
    /// assert_eq!(captures, vec![Some("world".to_string())]);
    /// assert!(pattern.captures("/goodbye/world").is_none());
    /// ```
    pub fn captures(&self, path: &str) -> Option<Vec<Option<String>>> {
        self.regex.captures(path).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect()
        })
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compiles a path specification into a matcher (pure function)
///
/// # Template rules
///
/// 1. Every `:identifier` (word characters) is recorded in `param_names`, in order
/// 2. Literal `.` is escaped
/// 3. Each placeholder becomes a capture of one or more characters other than `.`, `/` and `?`
/// 4. The pattern is anchored at the start and may be followed by a `?query` suffix
///
/// Raw regexes are kept verbatim with no parameter names.
///
/// # Examples
///
/// ```
/// use trailhead_router::compile;
///
/// let pattern = compile("/files/:name.json").unwrap();
/// assert_eq!(pattern.param_names(), ["name".to_string()]);
/// assert!(pattern.is_match("/files/report.json"));
/// assert!(!pattern.is_match("/files/reportxjson"));
/// ```
pub fn compile(spec: impl Into<PathSpec>) -> Result<CompiledPattern, RouterError> {
    match spec.into() {
        PathSpec::Template(template) => compile_template(&template),
        PathSpec::Raw(regex) => Ok(CompiledPattern {
            source: regex.as_str().to_string(),
            regex,
            param_names: Vec::new(),
        }),
    }
}

fn compile_template(template: &str) -> Result<CompiledPattern, RouterError> {
    let param_names = PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect();

    let escaped = template.replace('.', r"\.");
    let body = PLACEHOLDER.replace_all(&escaped, SEGMENT_CAPTURE);
    let expression = format!("^{}{}", body, QUERY_SUFFIX);

    let regex = Regex::new(&expression).map_err(|source| RouterError::InvalidPattern {
        pattern: template.to_string(),
        source,
    })?;

    Ok(CompiledPattern {
        source: template.to_string(),
        regex,
        param_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_static() {
        let pattern = compile("/about").unwrap();
        assert!(pattern.param_names().is_empty());
        assert!(pattern.is_match("/about"));
        assert!(pattern.is_match("/about?ref=home"));
        assert!(!pattern.is_match("/about/team"));
        assert_eq!(pattern.captures("/about").unwrap(), Vec::<Option<String>>::new());
    }

    #[test]
    fn test_compile_placeholders_in_order() {
        let pattern = compile("/users/:user_id/posts/:post").unwrap();
        assert_eq!(pattern.param_names(), ["user_id".to_string(), "post".to_string()]);
        assert_eq!(
            pattern.captures("/users/7/posts/hello").unwrap(),
            vec![Some("7".to_string()), Some("hello".to_string())]
        );
    }

    #[test]
    fn test_placeholder_is_single_segment() {
        let pattern = compile("/hello/:name").unwrap();
        assert!(!pattern.is_match("/hello/big/world"));
        assert!(!pattern.is_match("/hello/"));
        assert!(!pattern.is_match("/hello/a.b"));
    }

    #[test]
    fn test_dots_are_literal() {
        let pattern = compile("/feed.xml").unwrap();
        assert!(pattern.is_match("/feed.xml"));
        assert!(!pattern.is_match("/feedxxml"));
    }

    #[test]
    fn test_template_is_anchored_at_start() {
        let pattern = compile("/hello/:name").unwrap();
        assert!(!pattern.is_match("/prefix/hello/world"));
    }

    #[test]
    fn test_query_suffix_is_not_captured() {
        let pattern = compile("/:id").unwrap();
        assert_eq!(
            pattern.captures("/5?id=9").unwrap(),
            vec![Some("5".to_string())]
        );
    }

    #[test]
    fn test_raw_pattern_passes_through() {
        let regex = Regex::new(r"/(.*)").unwrap();
        let pattern = compile(regex).unwrap();
        assert_eq!(pattern.source(), r"/(.*)");
        assert!(pattern.param_names().is_empty());
        assert_eq!(
            pattern.captures("/a/b/c").unwrap(),
            vec![Some("a/b/c".to_string())]
        );
    }

    #[test]
    fn test_raw_optional_group_is_none() {
        let pattern = compile(Regex::new(r"^/docs(/(\w+))?$").unwrap()).unwrap();
        assert_eq!(pattern.captures("/docs").unwrap(), vec![None, None]);
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let err = compile("/broken(").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
    }
}
