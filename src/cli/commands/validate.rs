//! `kickoff validate FILES...`
//!
//! Loads each file through the full configuration pipeline and reports
//! every file before failing on the first invalid one.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{ConfigError, KickoffError, Severity, ValidationIssue};

#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// # Errors
///
/// Returns the first file's configuration error, or a validation error
/// built from its warnings under `--strict`.
pub fn run(args: &ValidateArgs) -> Result<(), KickoffError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_failure = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let outcome = check(&loader, path, args.strict);
        let report = match &outcome {
            Ok(warnings) => FileReport {
                file: path.clone(),
                valid: true,
                errors: Vec::new(),
                warnings: warnings.iter().map(describe_warning).collect(),
            },
            Err(e) => FileReport {
                file: path.clone(),
                valid: false,
                errors: describe_error(e),
                warnings: Vec::new(),
            },
        };
        if let Err(e) = outcome {
            first_failure.get_or_insert(e);
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_failure.map_or(Ok(()), |e| Err(e.into()))
}

fn check(
    loader: &ConfigLoader,
    path: &Path,
    strict: bool,
) -> Result<Vec<LoadWarning>, ConfigError> {
    let loaded = loader.load(path)?;
    if strict && !loaded.warnings.is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors: loaded
                .warnings
                .into_iter()
                .map(|w| ValidationIssue {
                    path: w.location.unwrap_or_default(),
                    message: w.message,
                    severity: Severity::Warning,
                })
                .collect(),
        });
    }
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(loaded.warnings)
}

fn describe_warning(w: &LoadWarning) -> String {
    match &w.location {
        Some(at) => format!("{} at {at}", w.message),
        None => w.message.clone(),
    }
}

fn describe_error(e: &ConfigError) -> Vec<String> {
    match e {
        ConfigError::ValidationError { errors, .. } => {
            errors.iter().map(ToString::to_string).collect()
        }
        other => vec![other.to_string()],
    }
}

fn print_human(report: &FileReport) {
    let file = report.file.display();
    if report.valid {
        println!("ok      {file}");
    } else {
        println!("invalid {file}");
    }
    for e in &report.errors {
        println!("  {e}");
    }
    for w in &report.warnings {
        println!("  warning: {w}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_file_passes() {
        let file = yaml("clock:\n  first_half: 90s\n");
        let warnings = check(&ConfigLoader::with_defaults(), file.path(), true).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_strict_promotes_warnings() {
        // Margin of 60s leaves no event window in a 90s half
        let file = yaml(
            "clock:\n  first_half: 90s\n  second_half: 90s\ndecisions:\n  event_margin: 60s\n",
        );
        let loader = ConfigLoader::with_defaults();
        assert!(!check(&loader, file.path(), false).unwrap().is_empty());

        let err = check(&loader, file.path(), true).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        assert!(describe_error(&err)[0].starts_with("warning:"));
    }

    #[test]
    fn test_invalid_file_lists_every_issue() {
        let file = yaml("decisions:\n  trigger_probability: 2.0\n  event_pool: []\n");
        let err = check(&ConfigLoader::with_defaults(), file.path(), false).unwrap_err();
        assert_eq!(describe_error(&err).len(), 2);
    }

    #[test]
    fn test_missing_file_reported() {
        let err = check(&ConfigLoader::with_defaults(), Path::new("/nonexistent/match.yaml"), false)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }
}
