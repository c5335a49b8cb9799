use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Hook,
    Bridge,
    Followup,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Hook, ContentType::Bridge, ContentType::Followup];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Hook => "hook",
            ContentType::Bridge => "bridge",
            ContentType::Followup => "followup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hook" | "hooks" => Some(ContentType::Hook),
            "bridge" | "bridges" => Some(ContentType::Bridge),
            "followup" | "followups" | "follow-up" | "follow-ups" => Some(ContentType::Followup),
            _ => None,
        }
    }

    /// Plural display label, e.g. "Follow-ups"
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Hook => "Hooks",
            ContentType::Bridge => "Bridges",
            ContentType::Followup => "Follow-ups",
        }
    }

    pub fn singular_label(&self) -> &'static str {
        match self {
            ContentType::Hook => "Hook",
            ContentType::Bridge => "Bridge",
            ContentType::Followup => "Follow-up",
        }
    }
}

/// The three buttons a voter can press.
///
/// `Star` is recorded as a vote event but never counts towards the
/// positive/negative tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[serde(alias = "green")]
    Positive,
    #[serde(alias = "red")]
    Negative,
    Star,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Positive => "positive",
            VoteType::Negative => "negative",
            VoteType::Star => "star",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "positive" | "green" => Some(VoteType::Positive),
            "negative" | "red" => Some(VoteType::Negative),
            "star" => Some(VoteType::Star),
            _ => None,
        }
    }

    pub fn counts_towards_tally(&self) -> bool {
        !matches!(self, VoteType::Star)
    }
}

/// Outcome of validating a single bulk-import row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportRowStatus {
    Valid,
    Duplicate,
    Invalid,
}
