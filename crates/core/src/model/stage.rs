use std::fmt;

/// The five assessment rounds a candidate moves through.
///
/// The first two are timed in-browser tests; the rest are conducted and
/// graded offline by staff through the grading panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Aptitude,
    Domain,
    GroupDiscussion,
    TechnicalInterview,
    Hr,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Aptitude,
        Stage::Domain,
        Stage::GroupDiscussion,
        Stage::TechnicalInterview,
        Stage::Hr,
    ];

    /// Display label used on the checklist hub.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::Aptitude => "Aptitude Test",
            Stage::Domain => "Technical Test",
            Stage::GroupDiscussion => "Group Discussion",
            Stage::TechnicalInterview => "Technical Interview",
            Stage::Hr => "HR Round",
        }
    }

    /// True for rounds graded by staff rather than timed in-browser.
    #[must_use]
    pub fn graded_offline(self) -> bool {
        matches!(
            self,
            Stage::GroupDiscussion | Stage::TechnicalInterview | Stage::Hr
        )
    }

    /// Round name as the grading service spells it.
    ///
    /// Only offline rounds can be graded through the panel; the timed
    /// tests are scored by the service itself.
    #[must_use]
    pub fn round_name(self) -> Option<&'static str> {
        match self {
            Stage::GroupDiscussion => Some("Group Discussion"),
            Stage::TechnicalInterview => Some("Technical"),
            Stage::Hr => Some("HR"),
            Stage::Aptitude | Stage::Domain => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
