use crate::error::{Error, Result};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

/// Options accepted by view rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Write the rendered text and finalize the response (default), or just return it
    pub should_finish_response: bool,
    /// Placeholder delimiters as an open/close pair, e.g. `{}` or `[[]]`
    pub meta: Option<String>,
    /// Wrap the view in the application layout when one is configured
    pub use_layout: bool,
}

impl RenderOptions {
    /// Options that return the rendered text instead of finishing the response
    pub fn raw() -> Self {
        Self {
            should_finish_response: false,
            ..Self::default()
        }
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.use_layout = false;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            should_finish_response: true,
            meta: None,
            use_layout: true,
        }
    }
}

/// Expands template text against view data
pub trait TemplateEngine: Send + Sync {
    fn expand(&self, template: &str, data: &Value, options: &RenderOptions) -> Result<String>;
}

/// Default engine: `{name}` and `{dotted.path}` interpolation
///
/// Placeholders with no matching value are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    fn interpolate(pattern: &Regex, content: &str, data: &Value) -> String {
        pattern
            .replace_all(content, |caps: &regex::Captures| {
                data.lookup(&caps[1])
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }
}

impl TemplateEngine for Renderer {
    fn expand(&self, template: &str, data: &Value, options: &RenderOptions) -> Result<String> {
        static VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_\.]*)\s*\}").unwrap()
        });

        match options.meta.as_deref() {
            None | Some("{}") => Ok(Self::interpolate(&VAR_REGEX, template, data)),
            Some(meta) => {
                let pattern = delimiter_regex(meta)?;
                Ok(Self::interpolate(&pattern, template, data))
            }
        }
    }
}

/// Builds the placeholder regex for a `meta` delimiter pair such as `[[]]`
fn delimiter_regex(meta: &str) -> Result<Regex> {
    let chars: Vec<char> = meta.chars().collect();
    if chars.is_empty() || chars.len() % 2 != 0 {
        return Err(Error::InvalidMeta(meta.to_string()));
    }

    let (open, close) = chars.split_at(chars.len() / 2);
    let open: String = open.iter().collect();
    let close: String = close.iter().collect();

    Regex::new(&format!(
        r"{}\s*([a-zA-Z_][a-zA-Z0-9_\.]*)\s*{}",
        regex::escape(&open),
        regex::escape(&close)
    ))
    .map_err(|_| Error::InvalidMeta(meta.to_string()))
}
