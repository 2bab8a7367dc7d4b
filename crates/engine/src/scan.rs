//! Ruleset directory scanner.
//!
//! Walks a directory for `*.yaml` / `*.yml` files and reports, per file,
//! whether it parses as a ruleset. Broken files never abort the scan: they
//! show up in the report with their error text so an operator can fix the
//! whole directory in one round. A file that is readable YAML but fails
//! validation still reports its document fields (name, kind, window,
//! discount flags); the file-stem fallback is only used when the YAML
//! itself cannot be read.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::{
    PricingError,
    parse::{DATE_FORMAT, parse_ruleset},
};

/// Scan report for a single YAML file.
#[derive(Clone, Debug)]
pub struct ScannedRuleset {
    pub file_path: PathBuf,
    /// Path relative to the scanned directory.
    pub relative_path: PathBuf,
    /// Ruleset name; `"Unbekannt"` when the document carries none, the
    /// file stem when the YAML could not be read at all.
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub is_valid: bool,
    /// Error text for invalid files.
    pub error: Option<String>,
    pub age_group_count: usize,
    pub has_role_discounts: bool,
    pub has_family_discount: bool,
}

impl ScannedRuleset {
    /// Report entry for a file whose YAML could not be read (malformed
    /// document or I/O failure). Only the file stem is known.
    fn from_error(file_path: PathBuf, relative_path: PathBuf, error: &PricingError) -> Self {
        let stem = file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unbekannt".to_string());
        Self {
            file_path,
            relative_path,
            name: stem,
            kind: "unknown".to_string(),
            description: None,
            valid_from: None,
            valid_until: None,
            is_valid: false,
            error: Some(error.to_string()),
            age_group_count: 0,
            has_role_discounts: false,
            has_family_discount: false,
        }
    }
}

/// Lenient view of a readable document, used to fill the report for files
/// that fail validation. Shapes are not trusted here; anything that does
/// not look right degrades to absent.
#[derive(Debug, Default, Deserialize)]
struct DocumentHead {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    valid_from: Option<Value>,
    valid_until: Option<Value>,
    age_groups: Option<Value>,
    role_discounts: Option<Value>,
    family_discount: Option<Value>,
}

impl DocumentHead {
    fn date(value: &Option<Value>) -> Option<NaiveDate> {
        value
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok())
    }

    fn into_report(
        self,
        file_path: PathBuf,
        relative_path: PathBuf,
        error: &PricingError,
    ) -> ScannedRuleset {
        let valid_from = Self::date(&self.valid_from);
        let valid_until = Self::date(&self.valid_until);
        let age_group_count = self
            .age_groups
            .as_ref()
            .and_then(Value::as_sequence)
            .map(|groups| groups.len())
            .unwrap_or(0);
        let has_role_discounts = self
            .role_discounts
            .as_ref()
            .and_then(Value::as_mapping)
            .is_some_and(|mapping| !mapping.is_empty());
        let has_family_discount = self
            .family_discount
            .as_ref()
            .and_then(|block| block.get("enabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        ScannedRuleset {
            file_path,
            relative_path,
            name: self.name.unwrap_or_else(|| "Unbekannt".to_string()),
            kind: self.kind.unwrap_or_else(|| "unknown".to_string()),
            description: self.description,
            valid_from,
            valid_until,
            is_valid: false,
            error: Some(error.to_string()),
            age_group_count,
            has_role_discounts,
            has_family_discount,
        }
    }
}

/// Scans `directory` for ruleset YAML files.
///
/// With `recursive` subdirectories are walked too. A missing or
/// non-directory path yields an empty report (with a warning), not an
/// error: scanning candidate locations that may not exist is the normal
/// mode of use.
pub fn scan_directory(directory: &Path, recursive: bool) -> Vec<ScannedRuleset> {
    if !directory.is_dir() {
        warn!(path = %directory.display(), "ruleset directory does not exist");
        return Vec::new();
    }

    let mut files = Vec::new();
    collect_yaml_files(directory, recursive, &mut files);
    files.sort();
    debug!(
        path = %directory.display(),
        count = files.len(),
        "found ruleset candidates"
    );

    files
        .into_iter()
        .map(|file| scan_file(file, directory))
        .collect()
}

/// Keeps only the entries that parsed and validated.
#[must_use]
pub fn filter_valid(scanned: Vec<ScannedRuleset>) -> Vec<ScannedRuleset> {
    scanned.into_iter().filter(|entry| entry.is_valid).collect()
}

fn collect_yaml_files(directory: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %directory.display(), %err, "cannot read directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_yaml_files(&path, recursive, files);
            }
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        ) {
            files.push(path);
        }
    }
}

fn scan_file(file_path: PathBuf, base: &Path) -> ScannedRuleset {
    let relative_path = file_path
        .strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| file_path.clone());

    let text = match fs::read_to_string(&file_path) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %file_path.display(), %err, "cannot read ruleset file");
            return ScannedRuleset::from_error(file_path, relative_path, &PricingError::Io(err));
        }
    };

    match parse_ruleset(&text) {
        Ok(ruleset) => ScannedRuleset {
            file_path,
            relative_path,
            name: ruleset.name.clone(),
            kind: ruleset.kind.clone(),
            description: ruleset.description.clone(),
            valid_from: Some(ruleset.valid_from),
            valid_until: Some(ruleset.valid_until),
            is_valid: true,
            error: None,
            age_group_count: ruleset.age_groups.len(),
            has_role_discounts: !ruleset.role_discounts.is_empty(),
            has_family_discount: ruleset.family_discount.enabled,
        },
        Err(err @ PricingError::InvalidRuleset(_)) => {
            // Readable document, bad content: keep what the file says.
            warn!(file = %file_path.display(), %err, "invalid ruleset file");
            let head: DocumentHead = serde_yaml::from_str(&text).unwrap_or_default();
            head.into_report(file_path, relative_path, &err)
        }
        Err(err) => {
            warn!(file = %file_path.display(), %err, "unreadable ruleset file");
            ScannedRuleset::from_error(file_path, relative_path, &err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_empty_report() {
        let report = scan_directory(Path::new("/definitely/not/here"), true);
        assert!(report.is_empty());
    }
}
