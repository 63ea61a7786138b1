use serde::{Deserialize, Serialize};
use std::fmt;

/// How much programming a practice domain involves.
///
/// Serialized with the spellings the service expects (`noCoding`,
/// `lowCoding`, `coding`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainCategory {
    NoCoding,
    LowCoding,
    Coding,
}

impl DomainCategory {
    pub const ALL: [DomainCategory; 3] = [
        DomainCategory::NoCoding,
        DomainCategory::LowCoding,
        DomainCategory::Coding,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DomainCategory::NoCoding => "No Coding",
            DomainCategory::LowCoding => "Low Coding",
            DomainCategory::Coding => "Coding",
        }
    }

    /// The selectable domains in this category.
    #[must_use]
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            DomainCategory::NoCoding => NO_CODING_DOMAINS,
            DomainCategory::LowCoding => LOW_CODING_DOMAINS,
            DomainCategory::Coding => CODING_DOMAINS,
        }
    }

    /// True if `domain` belongs to this category's catalog.
    #[must_use]
    pub fn offers(self, domain: &str) -> bool {
        self.domains().contains(&domain)
    }
}

impl fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static NO_CODING_DOMAINS: &[&str] = &[
    "Business Analysis",
    "Consulting",
    "Content Writing",
    "Customer Success",
    "Data Entry",
    "Digital Marketing",
    "Event Management",
    "Finance Basics",
    "Graphic Design",
    "HR & Recruitment",
    "Operations",
    "Project Management",
    "Sales",
    "Teaching & Training",
    "UX Research",
];

static LOW_CODING_DOMAINS: &[&str] = &[
    "Basic Dashboarding",
    "BI Tools",
    "CMS Admin",
    "CRM Basics",
    "Data Analyst",
    "ETL Basics",
    "Excel Power Users",
    "Forms & Workflows",
    "Low-Code Apps",
    "No-Code Mobile Apps",
    "Power Platform",
    "RPA Basics",
    "Sheets Automation",
    "WordPress",
    "Zapier Automations",
];

static CODING_DOMAINS: &[&str] = &[
    "AI/ML",
    "Backend Development",
    "Blockchain",
    "Cloud Engineering",
    "Data Science",
    "Database Admin",
    "DevOps",
    "Embedded Systems",
    "Frontend Development",
    "Game Development",
    "Mobile Dev",
    "QA & Testing",
    "Security",
    "SRE",
    "Web Development",
];
