use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    /// Labels starting with this prefix carry a required count as their suffix.
    pub label_prefix: String,
    /// Applies when no label carries the prefix.
    pub default_threshold: i64,
}

/// Where the applied threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No label matched the prefix.
    Default(i64),
    /// Maximum over `matched` prefixed labels; unparsable or non-positive suffixes count as 0.
    Labeled { value: i64, matched: usize },
}

impl Resolution {
    pub fn value(self) -> i64 {
        match self {
            Resolution::Default(value) | Resolution::Labeled { value, .. } => value,
        }
    }
}

impl ThresholdConfig {
    pub fn new(label_prefix: impl Into<String>, default_threshold: i64) -> Self {
        Self {
            label_prefix: label_prefix.into(),
            default_threshold,
        }
    }

    pub fn resolve<'a, I>(&self, labels: I) -> Resolution
    where
        I: IntoIterator<Item = &'a Label>,
    {
        let mut matched = 0;
        let mut value = 0;
        for suffix in labels
            .into_iter()
            .filter_map(|l| l.name.strip_prefix(self.label_prefix.as_str()))
        {
            matched += 1;
            value = value.max(normalize_suffix(suffix));
        }

        if matched == 0 {
            Resolution::Default(self.default_threshold)
        } else {
            Resolution::Labeled { value, matched }
        }
    }
}

// A malformed or low label contributes 0, never the configured default.
fn normalize_suffix(suffix: &str) -> i64 {
    match suffix.parse::<i64>() {
        Ok(n) if n >= 1 => n,
        _ => 0,
    }
}
