//! Tenant directory: apartment number → household names.
//!
//! The directory is ordered. Iteration follows insertion order (local
//! entries first, in the order they were added; remote-only entries after,
//! in file order), and the classifier's tie-break relies on that.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;
use crate::models::Tenant;

/// One apartment's entry: the primary family name plus every name a
/// transfer might arrive under.
#[derive(Debug, Clone)]
pub struct TenantEntry {
    pub name: String,
    pub alt_names: Vec<String>,
}

impl TenantEntry {
    pub fn new(name: &str, alt_names: Vec<String>) -> Self {
        let name = name.trim();
        TenantEntry {
            name: if name.is_empty() {
                "Unknown".to_string()
            } else {
                name.to_string()
            },
            alt_names: alt_names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Names worth scoring a memo against: the primary name plus the
    /// alternates, deduplicated without reordering.
    pub fn match_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![self.name.as_str()];
        for alt in &self.alt_names {
            if !names.contains(&alt.as_str()) {
                names.push(alt);
            }
        }
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct TenantDirectory {
    apartments: IndexMap<String, TenantEntry>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        TenantDirectory::default()
    }

    pub fn len(&self) -> usize {
        self.apartments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apartments.is_empty()
    }

    /// Insert or replace an entry. Blank apartment keys are dropped.
    pub fn insert(&mut self, apartment: &str, entry: TenantEntry) {
        let apartment = apartment.trim();
        if apartment.is_empty() {
            return;
        }
        self.apartments.insert(apartment.to_string(), entry);
    }

    pub fn get(&self, apartment: &str) -> Option<&TenantEntry> {
        self.apartments.get(apartment.trim())
    }

    /// Insertion-order iteration.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TenantEntry)> {
        self.apartments.iter()
    }

    /// Overlay a second directory on top of this one. Overlay entries win on
    /// key collision (the existing apartment keeps its position); alternate
    /// names are unioned without duplicates, overlay names first.
    pub fn merge(&mut self, overlay: TenantDirectory) {
        for (apartment, incoming) in overlay.apartments {
            match self.apartments.get_mut(&apartment) {
                Some(existing) => {
                    let mut alt_names = incoming.alt_names;
                    for name in &existing.alt_names {
                        if !alt_names.contains(name) {
                            alt_names.push(name.clone());
                        }
                    }
                    existing.name = incoming.name;
                    existing.alt_names = alt_names;
                }
                None => {
                    self.apartments.insert(apartment, incoming);
                }
            }
        }
    }

    pub fn from_rows(rows: Vec<Tenant>) -> Self {
        let mut dir = TenantDirectory::new();
        for row in rows {
            dir.insert(&row.apartment, TenantEntry::new(&row.name, row.alt_names));
        }
        dir
    }

    /// Load a downloaded sheet export: three columns, apartment / landlord /
    /// tenant. A non-numeric first cell in the first row is a header row.
    /// Primary name is the tenant, falling back to the landlord; both become
    /// alternates.
    pub fn from_csv_export(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut dir = TenantDirectory::new();
        for record in reader.records() {
            let record = record?;
            let apartment = record.get(0).unwrap_or("").trim().to_string();
            // header rows and junk lines both fail the digits test
            if apartment.is_empty() || !apartment.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let landlord = record.get(1).unwrap_or("").trim().to_string();
            let tenant = record.get(2).unwrap_or("").trim().to_string();

            let primary = if !tenant.is_empty() {
                tenant.clone()
            } else {
                landlord.clone()
            };
            let alt_names = vec![landlord, tenant];
            dir.insert(&apartment, TenantEntry::new(&primary, alt_names));
        }
        Ok(dir)
    }

    /// Load the legacy JSON config, `{"apartments": {"76": {"familyName":
    /// ..., "altNames": [...]}}}`. Key order in the file is kept.
    pub fn from_legacy_json(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct LegacyEntry {
            #[serde(rename = "familyName", default)]
            family_name: String,
            #[serde(rename = "altNames", default)]
            alt_names: Vec<String>,
        }
        #[derive(Deserialize)]
        struct LegacyConfig {
            #[serde(default)]
            apartments: IndexMap<String, LegacyEntry>,
        }

        let data = std::fs::read_to_string(path)?;
        let config: LegacyConfig = serde_json::from_str(&data)
            .map_err(|e| crate::error::VaadError::Other(format!("bad tenants file: {e}")))?;

        let mut dir = TenantDirectory::new();
        for (apartment, entry) in config.apartments {
            dir.insert(
                &apartment,
                TenantEntry::new(&entry.family_name, entry.alt_names),
            );
        }
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(name: &str, alts: &[&str]) -> TenantEntry {
        TenantEntry::new(name, alts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_insert_defaults_blank_name() {
        let mut dir = TenantDirectory::new();
        dir.insert("12", entry("  ", &[]));
        assert_eq!(dir.get("12").map(|e| e.name.as_str()), Some("Unknown"));
    }

    #[test]
    fn test_insert_drops_blank_key() {
        let mut dir = TenantDirectory::new();
        dir.insert("   ", entry("כהן", &[]));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut dir = TenantDirectory::new();
        dir.insert("9", entry("לוי", &[]));
        dir.insert("2", entry("כהן", &[]));
        dir.insert("31", entry("פרץ", &[]));
        let keys: Vec<&str> = dir.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["9", "2", "31"]);
    }

    #[test]
    fn test_merge_overlay_wins_and_unions_alternates() {
        let mut local = TenantDirectory::new();
        local.insert("5", entry("כהן", &["דוד כהן"]));
        local.insert("6", entry("לוי", &[]));

        let mut remote = TenantDirectory::new();
        remote.insert("5", entry("כהן-שמש", &["רחל כהן שמש", "דוד כהן"]));
        remote.insert("8", entry("פרץ", &[]));

        local.merge(remote);

        let five = local.get("5").unwrap();
        assert_eq!(five.name, "כהן-שמש");
        assert_eq!(five.alt_names, vec!["רחל כהן שמש", "דוד כהן"]);

        // positions: existing keys keep theirs, new keys append
        let keys: Vec<&str> = local.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["5", "6", "8"]);
    }

    #[test]
    fn test_match_names_includes_primary_once() {
        let e = entry("גז", &["ניצנה גז", "גז", "מרדכי גז"]);
        assert_eq!(e.match_names(), vec!["גז", "ניצנה גז", "מרדכי גז"]);
    }

    #[test]
    fn test_from_csv_export_skips_header_and_fills_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenants.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "דירה,בעלים,שוכר").unwrap();
        writeln!(f, "76,ניצנה גז,").unwrap();
        writeln!(f, "12,אבי לוי,רות פרץ").unwrap();
        drop(f);

        let loaded = TenantDirectory::from_csv_export(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("76").unwrap().name, "ניצנה גז");
        assert_eq!(loaded.get("12").unwrap().name, "רות פרץ");
        assert_eq!(
            loaded.get("12").unwrap().alt_names,
            vec!["אבי לוי", "רות פרץ"]
        );
    }

    #[test]
    fn test_from_legacy_json_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenants.json");
        std::fs::write(
            &path,
            r#"{"apartments":{"76":{"familyName":"גז","altNames":["ניצנה גז","מרדכי גז"]},"3":{"familyName":"לוי"}}}"#,
        )
        .unwrap();

        let loaded = TenantDirectory::from_legacy_json(&path).unwrap();
        let keys: Vec<&str> = loaded.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["76", "3"]);
        assert_eq!(loaded.get("76").unwrap().alt_names.len(), 2);
    }
}
