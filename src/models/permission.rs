//! Permission grants

use regex::Regex;
use serde::Serialize;
use sqlx::FromRow;

/// Grant of an action pattern on a resource pattern, held by a role or a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Permission {
    pub id: i32,
    pub action: String,
    pub resource: String,
    pub role_id: Option<i32>,
    pub user_id: Option<i32>,
}

impl Permission {
    /// Whether this grant covers `action` on `resource`
    pub fn grants(&self, action: &str, resource: &str) -> bool {
        pattern_matches(&self.action, action) && pattern_matches(&self.resource, resource)
    }
}

/// Match `target` against a literal pattern where `*` stands for any run of characters.
/// The whole target has to match.
pub fn pattern_matches(pattern: &str, target: &str) -> bool {
    let expr = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    Regex::new(&expr)
        .map(|re| re.is_match(target))
        .unwrap_or(false)
}
