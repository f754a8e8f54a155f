//! Route parameters
//!
//! A `ParamBag` is built fresh for every dispatch from the captures of the
//! matched route, then merged with whatever the request itself supplied.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::hash_map;
use std::collections::HashMap;

/// Key under which unnamed captures are collected
pub const SPLAT: &str = "splat";

/// A parameter value: one string, or several for a multi-capture splat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The value when it holds exactly one string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(_) => None,
        }
    }

    /// Every string held, whatever the shape
    pub fn as_slice(&self) -> &[String] {
        match self {
            ParamValue::One(value) => std::slice::from_ref(value),
            ParamValue::Many(values) => values,
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::One(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Many(values)
    }
}

impl PartialEq<str> for ParamValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for ParamValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Parameter name → value mapping for a single request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParamBag {
    values: HashMap<String, ParamValue>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds route captures to names (pure function)
    ///
    /// Captures are URL-unescaped. A capture at index `i` is bound to
    /// `names[i]`; captures past the end of `names` are collected under
    /// [`SPLAT`], skipping groups that did not participate. A splat holding a
    /// single value is stored as that value rather than a one-element list.
    ///
    /// # Examples
    ///
    /// ```
    /// use trailhead_router::{ParamBag, ParamValue};
    ///
    /// let names = vec!["name".to_string()];
    /// let bag = ParamBag::from_captures(&names, vec![
    ///     Some("hello%20world".to_string()),
    ///     Some("a".to_string()),
    ///     None,
    ///     Some("b".to_string()),
    /// ]);
    ///
    /// assert_eq!(bag.get_str("name"), Some("hello world"));
    /// assert_eq!(
    ///     bag.splat(),
    ///     Some(&ParamValue::Many(vec!["a".to_string(), "b".to_string()]))
    /// );
    /// ```
    pub fn from_captures<I>(names: &[String], captures: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut bag = Self::new();
        let mut splat = Vec::new();

        for (index, capture) in captures.into_iter().enumerate() {
            let Some(raw) = capture else { continue };
            let value = unescape(&raw);
            match names.get(index) {
                Some(name) => bag.insert(name.clone(), value),
                None => splat.push(value),
            }
        }

        match splat.len() {
            0 => {}
            1 => bag.insert(SPLAT, splat.remove(0)),
            _ => bag.insert(SPLAT, splat),
        }

        bag
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Single-string value of a parameter
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name)?.as_str()
    }

    /// Parses a single-string parameter into `T`
    pub fn get_as<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get_str(name)?.parse().ok()
    }

    /// The splat entry, if any capture was left unnamed
    pub fn splat(&self) -> Option<&ParamValue> {
        self.values.get(SPLAT)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    /// Merges `other` into this bag; colliding keys take the incoming value
    pub fn merge<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (name, value) in other {
            self.insert(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, ParamValue> {
        self.values.iter()
    }

    pub fn as_map(&self) -> &HashMap<String, ParamValue> {
        &self.values
    }
}

impl<'a> IntoIterator for &'a ParamBag {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = hash_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for ParamBag {
    type Item = (String, ParamValue);
    type IntoIter = hash_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Percent-decodes a captured segment, keeping the raw text when it is not valid UTF-8
fn unescape(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
