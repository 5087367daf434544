use thiserror::Error;
use crate::models::{Domain, Label};

/// Errors raised when resolving precautions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    #[error("invalid label {0}, expected 0 or 1")]
    InvalidLabel(i64),

    #[error("no precautions recorded for {domain} label {label}")]
    MissingEntry { domain: Domain, label: u8 },
}

/// Read-only table of advisory text keyed by domain and label
pub struct PrecautionCatalog {
    entries: &'static [(Domain, Label, &'static [&'static str])],
}

impl PrecautionCatalog {
    pub fn resolve(&self, domain: Domain, label: Label) -> Result<&'static [&'static str], LookupError> {
        self.entries
            .iter()
            .find(|(d, l, _)| *d == domain && *l == label)
            .map(|(_, _, precautions)| *precautions)
            .ok_or(LookupError::MissingEntry { domain, label: label.as_u8() })
    }
}

pub static PRECAUTIONS: PrecautionCatalog = PrecautionCatalog {
    entries: &[
        (Domain::Maternal, Label::Positive, &[
            "Monitor your blood glucose levels regularly as advised by your care team.",
            "Follow a balanced diet that limits refined sugars and simple carbohydrates.",
            "Aim for regular moderate physical activity such as walking, unless advised otherwise.",
            "Attend all scheduled antenatal appointments and glucose tolerance testing.",
            "Discuss treatment options, including medication, with your healthcare provider.",
        ]),
        (Domain::Maternal, Label::Negative, &[
            "Maintain a balanced and nutritious diet throughout pregnancy.",
            "Stay physically active with activities recommended by your midwife.",
            "Continue routine antenatal check-ups.",
            "Report symptoms such as excessive thirst, frequent urination or fatigue.",
        ]),
        (Domain::ChildOutcome, Label::Positive, &[
            "Arrange close neonatal monitoring after delivery.",
            "Check the baby's blood glucose levels in the first hours after birth.",
            "Ensure early and frequent feeding to stabilise blood sugar.",
            "Schedule follow-up paediatric assessments for growth and development.",
            "Discuss any concerns about breathing, feeding or jaundice with the neonatal team.",
        ]),
        (Domain::ChildOutcome, Label::Negative, &[
            "Continue routine postnatal care and check-ups.",
            "Support feeding and monitor the baby's weight gain.",
            "Keep up with the recommended immunisation schedule.",
            "Seek medical advice if the baby shows signs of illness.",
        ]),
    ],
};

/// Precautions for a domain and label
pub fn resolve(domain: Domain, label: Label) -> Result<&'static [&'static str], LookupError> {
    PRECAUTIONS.resolve(domain, label)
}

/// Precautions for an untyped domain name and numeric label
///
/// Entry point for callers holding raw strings and integers
/// rather than `Domain`/`Label`. The prediction routes use [`resolve`]; this
/// is where `UnknownDomain` and `InvalidLabel` can actually occur.
pub fn resolve_raw(domain: &str, label: i64) -> Result<&'static [&'static str], LookupError> {
    let domain: Domain = domain.parse().map_err(LookupError::UnknownDomain)?;
    let label = u8::try_from(label)
        .ok()
        .and_then(|l| Label::try_from(l).ok())
        .ok_or(LookupError::InvalidLabel(label))?;
    resolve(domain, label)
}
