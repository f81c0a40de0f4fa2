//! Transaction classifier: free-text transfer description → apartment.
//!
//! Two stages, first hit wins. An explicit apartment number in the memo is
//! authoritative; failing that, household names are fuzzy-matched against
//! the memo with `max(token-set score, best per-name partial score)` and a
//! fixed acceptance threshold.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::directory::TenantDirectory;
use crate::similarity::{partial_ratio, token_set_ratio};

/// Fuzzy scores at or above this (0–100 scale) are accepted.
const MATCH_THRESHOLD: f64 = 75.0;

/// Confidence assigned to an explicit apartment-number hit.
const APT_NUMBER_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    RegexAptNumber,
    FuzzyNameMatch,
    None,
    Failed,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::RegexAptNumber => "regex_apt_number",
            MatchMethod::FuzzyNameMatch => "fuzzy_name_match",
            MatchMethod::None => "none",
            MatchMethod::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub apartment: Option<String>,
    pub tenant_name: Option<String>,
    pub confidence: f64,
    pub method: MatchMethod,
}

impl Classification {
    fn miss(method: MatchMethod) -> Self {
        Classification {
            apartment: None,
            tenant_name: None,
            confidence: 0.0,
            method,
        }
    }
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"בוצע ע"י:|עבור:|חשבון:"#).expect("invalid regex"))
}

fn vav_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bו([א-ת])").expect("invalid regex"))
}

fn apt_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // matches "דירה 5", "דירה מס' 53", "מספר: 5", "מס-12"
    RE.get_or_init(|| {
        Regex::new(r"(?:דירה|דירה מס'|מספר|מס)\s*[:.-]?\s*(\d+)").expect("invalid regex")
    })
}

/// Drop bank label tokens, detach the conjunctive ו from the following word
/// ("ומרדכי" reads as " מרדכי"), lowercase the non-Hebrew part.
fn normalize(description: &str) -> String {
    let cleaned = label_re().replace_all(description.trim(), " ");
    let cleaned = vav_prefix_re().replace_all(&cleaned, " $1");
    cleaned.to_lowercase().trim().to_string()
}

/// Map a transfer description to an apartment.
///
/// Blank descriptions return `method = none`; anything that clears neither
/// stage returns `method = failed`. Malformed input degrades to those
/// results, it never panics. Fuzzy ties go to the apartment inserted into
/// the directory first.
pub fn classify(description: &str, directory: &TenantDirectory) -> Classification {
    if description.trim().is_empty() {
        return Classification::miss(MatchMethod::None);
    }

    let clean = normalize(description);

    if let Some(caps) = apt_number_re().captures(&clean) {
        if let Some(num) = caps.get(1) {
            let apartment = num.as_str();
            if let Some(entry) = directory.get(apartment) {
                return Classification {
                    apartment: Some(apartment.to_string()),
                    tenant_name: Some(entry.name.clone()),
                    confidence: APT_NUMBER_CONFIDENCE,
                    method: MatchMethod::RegexAptNumber,
                };
            }
        }
    }

    let mut best: Option<(&str, &str)> = None;
    let mut best_score = 0.0_f64;

    for (apartment, entry) in directory.iter() {
        let names = entry.match_names();
        let combined = names.join(" ");

        let mut score = token_set_ratio(&combined, &clean);
        for name in &names {
            score = score.max(partial_ratio(name, &clean));
        }

        // strict > keeps the earliest apartment on equal scores
        if score > best_score {
            best_score = score;
            best = Some((apartment, &entry.name));
        }
    }

    if best_score >= MATCH_THRESHOLD {
        if let Some((apartment, name)) = best {
            return Classification {
                apartment: Some(apartment.to_string()),
                tenant_name: Some(name.to_string()),
                confidence: best_score / 100.0,
                method: MatchMethod::FuzzyNameMatch,
            };
        }
    }

    Classification::miss(MatchMethod::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::TenantEntry;

    fn test_directory() -> TenantDirectory {
        let mut dir = TenantDirectory::new();
        dir.insert(
            "53",
            TenantEntry::new("כהן", vec!["משפחת כהן".into(), "דוד כהן".into()]),
        );
        dir.insert("54", TenantEntry::new("לוי", vec!["אבי לוי".into()]));
        dir.insert(
            "76",
            TenantEntry::new("גז", vec!["ניצנה גז".into(), "מרדכי גז".into()]),
        );
        dir
    }

    #[test]
    fn test_empty_description() {
        let result = classify("", &test_directory());
        assert_eq!(result.method, MatchMethod::None);
        assert!(result.apartment.is_none());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_empty_directory_fails() {
        let result = classify("תשלום ממשפחת כהן", &TenantDirectory::new());
        assert_eq!(result.method, MatchMethod::Failed);
        assert!(result.apartment.is_none());
    }

    #[test]
    fn test_apartment_number_match() {
        let result = classify("העברה עבור ועד בית דירה 53", &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("53"));
        assert_eq!(result.method, MatchMethod::RegexAptNumber);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.tenant_name.as_deref(), Some("כהן"));
    }

    #[test]
    fn test_apartment_number_variants() {
        for desc in [
            "דירה 53",
            "דירה מס 53",
            "דירה מס' 53",
            "מספר 53",
            "מס: 53",
            "דירה-53",
        ] {
            let result = classify(desc, &test_directory());
            assert_eq!(result.apartment.as_deref(), Some("53"), "failed on {desc}");
            assert_eq!(result.method, MatchMethod::RegexAptNumber);
        }
    }

    #[test]
    fn test_apartment_number_beats_name() {
        // memo names the 53 household but cites apartment 54
        let result = classify("תשלום דוד כהן דירה 54", &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("54"));
        assert_eq!(result.method, MatchMethod::RegexAptNumber);
    }

    #[test]
    fn test_unknown_apartment_number_falls_through_to_fuzzy() {
        let result = classify("דירה 99 דוד כהן", &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("53"));
        assert_eq!(result.method, MatchMethod::FuzzyNameMatch);
    }

    #[test]
    fn test_fuzzy_family_name() {
        let result = classify("תשלום ממשפחת כהן", &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("53"));
        assert_eq!(result.method, MatchMethod::FuzzyNameMatch);
        assert!(result.confidence >= 0.75);
    }

    #[test]
    fn test_joint_transfer_matches_household() {
        let desc = "בוצע ע\"י: ניצנה ומרדכי גז עבור: ועד בית";
        let result = classify(desc, &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("76"));
        assert_eq!(result.method, MatchMethod::FuzzyNameMatch);
        assert!(result.confidence >= 0.75);
        assert_eq!(result.tenant_name.as_deref(), Some("גז"));
    }

    #[test]
    fn test_label_token_stripped() {
        let result = classify("חשבון: אבי לוי", &test_directory());
        assert_eq!(result.apartment.as_deref(), Some("54"));
    }

    #[test]
    fn test_unrelated_description_fails() {
        let result = classify("סתם העברה לא קשורה", &test_directory());
        assert_eq!(result.method, MatchMethod::Failed);
        assert!(result.apartment.is_none());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_tie_goes_to_first_inserted() {
        let mut dir = TenantDirectory::new();
        dir.insert("2", TenantEntry::new("כהן", vec![]));
        dir.insert("1", TenantEntry::new("כהן", vec![]));
        let result = classify("כהן", &dir);
        assert_eq!(result.apartment.as_deref(), Some("2"));
    }

    #[test]
    fn test_normalize_detaches_vav() {
        assert_eq!(normalize("ומרדכי"), "מרדכי");
        // mid-word ו is not a prefix
        assert_eq!(normalize("גוטמן"), "גוטמן");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("  Transfer From GAZ  "), "transfer from gaz");
    }
}
