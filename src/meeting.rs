//! Meeting type classification.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The kind of meeting being analyzed.
///
/// Selects which prompt pair the analyzer uses. Unrecognized tags fall back
/// to `General` instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MeetingType {
    #[default]
    General,
    Standup,
    Planning,
    Retrospective,
}

impl MeetingType {
    pub const ALL: [MeetingType; 4] = [
        MeetingType::General,
        MeetingType::Standup,
        MeetingType::Planning,
        MeetingType::Retrospective,
    ];

    /// Parse a tag, falling back to `General` for anything unrecognized.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            warn!("Unknown meeting type '{}', using general", tag);
            MeetingType::General
        })
    }

    /// Human-readable label used in reports and chat messages.
    pub fn label(&self) -> &'static str {
        match self {
            MeetingType::General => "General Meeting",
            MeetingType::Standup => "Daily Standup",
            MeetingType::Planning => "Planning Session",
            MeetingType::Retrospective => "Retrospective",
        }
    }
}

impl std::str::FromStr for MeetingType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(MeetingType::General),
            "standup" | "scrum" => Ok(MeetingType::Standup),
            "planning" => Ok(MeetingType::Planning),
            "retrospective" | "retro" => Ok(MeetingType::Retrospective),
            _ => Err(format!("Unknown meeting type: {}", s)),
        }
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingType::General => write!(f, "general"),
            MeetingType::Standup => write!(f, "standup"),
            MeetingType::Planning => write!(f, "planning"),
            MeetingType::Retrospective => write!(f, "retrospective"),
        }
    }
}

impl From<String> for MeetingType {
    fn from(s: String) -> Self {
        MeetingType::from_tag(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("standup".parse::<MeetingType>(), Ok(MeetingType::Standup));
        assert_eq!("RETRO".parse::<MeetingType>(), Ok(MeetingType::Retrospective));
        assert_eq!("planning".parse::<MeetingType>(), Ok(MeetingType::Planning));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_general() {
        assert_eq!(MeetingType::from_tag("all-hands"), MeetingType::General);
        assert!("all-hands".parse::<MeetingType>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for mt in MeetingType::ALL {
            assert_eq!(mt.to_string().parse::<MeetingType>(), Ok(mt));
        }
    }
}
