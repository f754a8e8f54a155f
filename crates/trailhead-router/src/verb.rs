use std::fmt;
use std::str::FromStr;

use crate::RouterError;

/// HTTP verbs a route can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Every routable verb, in declaration order
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse; anything outside the fixed set is `InvalidVerb`
///
/// ```
/// use trailhead_router::Verb;
///
/// assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
/// assert!("PATCH".parse::<Verb>().is_err());
/// ```
impl FromStr for Verb {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == upper)
            .ok_or_else(|| RouterError::InvalidVerb(s.to_string()))
    }
}
