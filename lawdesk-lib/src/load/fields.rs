use std::collections::HashMap;

/// Marker used when neither the summary nor the applicability of a law is known.
pub const NOT_AVAILABLE: &str = "Information not available.";

/// Ordered header variants accepted for one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Header names tried in order; the first present, non-blank value wins
    pub candidates: &'static [&'static str],
    /// Value used when no candidate matches
    pub default: &'static str,
}

impl FieldSpec {
    /// Resolve this field against a row, falling back to the default.
    #[must_use]
    pub fn resolve(&self, row: &HashMap<String, String>) -> String {
        resolve_field(row, self.candidates)
            .unwrap_or(self.default)
            .to_owned()
    }
}

pub const LAW_CATEGORY: FieldSpec = FieldSpec {
    candidates: &["Law Category", "Law Type", "Category", "law_category"],
    default: "",
};

pub const LAW_NAME: FieldSpec = FieldSpec {
    candidates: &[
        "Law Name / Code",
        "Law Name/Section",
        "Law Name",
        "Section",
        "law_name",
    ],
    default: "",
};

pub const SUMMARY: FieldSpec = FieldSpec {
    candidates: &["Law Summary", "Law Details", "summary", "details"],
    default: NOT_AVAILABLE,
};

pub const DETAILS: FieldSpec = FieldSpec {
    candidates: &["Law Details", "details"],
    default: "",
};

pub const WHEN_APPLICABLE: FieldSpec = FieldSpec {
    candidates: &["Applicability", "When Applicable", "when_applicable"],
    default: NOT_AVAILABLE,
};

pub const WHOM_TO_APPROACH: FieldSpec = FieldSpec {
    candidates: &["Whom to Approach", "Contact Person", "whom_to_approach"],
    default: "",
};

pub const HISTORICAL_CONTEXT: FieldSpec = FieldSpec {
    candidates: &["Historical Context", "Context", "historical_context"],
    default: "",
};

pub const EXAMPLE_CASES: FieldSpec = FieldSpec {
    candidates: &[
        "Real-life Example",
        "Example Use Cases",
        "Examples",
        "example_cases",
    ],
    default: "",
};

/// Return the first present, non-blank value among `candidates`, trimmed.
///
/// Keys are matched exactly; callers are expected to have trimmed the headers.
#[must_use]
pub fn resolve_field<'a>(row: &'a HashMap<String, String>, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|key| row.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}
