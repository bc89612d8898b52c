use std::fmt;

/// One scalar parameter of a query key. Parameters are ordered; two keys
/// are the same cache entry iff kind and every parameter compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyParam {
    Text(String),
    Int(i64),
    Flag(bool),
}

impl fmt::Display for KeyParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
            Self::Flag(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for KeyParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for KeyParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for KeyParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for KeyParam {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for KeyParam {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Deterministic identity of one cached remote result: a resource kind plus
/// zero or more scalar parameters in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: &'static str,
    params: Vec<KeyParam>,
}

impl QueryKey {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: impl Into<KeyParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn params(&self) -> &[KeyParam] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind)?;
        f.write_str("(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// A key prefix for bulk invalidation: matches every key whose kind starts
/// with `kind_prefix` and whose leading parameters equal `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
    kind_prefix: String,
    params: Vec<KeyParam>,
}

impl KeyPrefix {
    pub fn kind(kind_prefix: impl Into<String>) -> Self {
        Self {
            kind_prefix: kind_prefix.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: impl Into<KeyParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        key.kind.starts_with(self.kind_prefix.as_str())
            && self.params.len() <= key.params().len()
            && self
                .params
                .iter()
                .zip(key.params())
                .all(|(prefix_param, key_param)| prefix_param == key_param)
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind_prefix)?;
        if !self.params.is_empty() {
            f.write_str("(")?;
            for (index, param) in self.params.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str(", …)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structurally_equal_keys_are_the_same_entry() {
        let left = QueryKey::new("clickup.tasks").param("ws123").param(false).param(0u32);
        let right = QueryKey::new("clickup.tasks").param("ws123").param(false).param(0u32);
        assert_eq!(left, right);
    }

    #[test]
    fn changing_one_parameter_changes_the_key() {
        let base = QueryKey::new("clickup.tasks").param("ws123").param(false);
        let closed = QueryKey::new("clickup.tasks").param("ws123").param(true);
        let other_workspace = QueryKey::new("clickup.tasks").param("ws999").param(false);
        assert_ne!(base, closed);
        assert_ne!(base, other_workspace);
    }

    #[test]
    fn prefix_matches_kind_and_leading_params() {
        let key = QueryKey::new("clickup.tasks").param("ws123").param(false);

        assert!(KeyPrefix::kind("clickup").matches(&key));
        assert!(KeyPrefix::kind("clickup.tasks").matches(&key));
        assert!(KeyPrefix::kind("clickup.tasks").param("ws123").matches(&key));
        assert!(!KeyPrefix::kind("clickup.tasks").param("ws999").matches(&key));
        assert!(!KeyPrefix::kind("github").matches(&key));
        // A prefix longer than the key never matches.
        assert!(!KeyPrefix::kind("clickup.tasks")
            .param("ws123")
            .param(false)
            .param(0u32)
            .matches(&key));
    }

    #[test]
    fn display_renders_kind_and_params() {
        let key = QueryKey::new("clickup.tasks").param("ws123").param(true).param(2u32);
        assert_eq!(key.to_string(), "clickup.tasks(ws123, true, 2)");
    }
}
