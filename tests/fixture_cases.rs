use std::fs;
use std::path::{Path, PathBuf};

use ctm_textgrid::{
    convert_tables, ConversionError, DuplicateKeyPolicy, LabelField, TableOptions, UtteranceTier,
};
use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;

const SUITE_NAME: &str = "ctm_fixture_cases";
const TIME_DELTA_SEC: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct Expected {
    #[serde(default)]
    duplicate_keys: DuplicateKeyPolicy,
    #[serde(default)]
    label_field: LabelField,
    #[serde(default)]
    tiers: Vec<ExpectedTier>,
    #[serde(default)]
    error: Option<ExpectedError>,
}

#[derive(Debug, Deserialize)]
struct ExpectedTier {
    utterance_id: String,
    audio_path: String,
    intervals: Vec<(f64, f64, String)>,
}

#[derive(Debug, Deserialize)]
struct ExpectedError {
    kind: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    line: Option<usize>,
}

fn main() {
    let args = Arguments::from_args();
    let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    let cases = match collect_case_dirs(&fixtures_dir) {
        Ok(cases) if !cases.is_empty() => cases,
        Ok(_) => {
            run_setup_failure(
                &args,
                format!("No fixture directories under '{}'.", fixtures_dir.display()),
            );
            return;
        }
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };

    let tests = cases
        .into_iter()
        .map(|case_dir| {
            let name = case_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Trial::test(format!("{SUITE_NAME}::{name}"), move || {
                run_case(&case_dir).map_err(Failed::from)
            })
        })
        .collect::<Vec<_>>();

    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || {
        Err(Failed::from(message))
    });
    libtest_mimic::run(args, vec![test]).exit();
}

fn collect_case_dirs(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|err| format!("Failed to read directory '{}': {err}", dir.display()))?;
    let mut cases = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("Failed to read entry in '{}': {err}", dir.display()))?
            .path();
        if path.join("expected.json").is_file() {
            cases.push(path);
        }
    }
    cases.sort();
    Ok(cases)
}

fn read_fixture(case_dir: &Path, name: &str) -> Result<String, String> {
    let path = case_dir.join(name);
    fs::read_to_string(&path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn run_case(case_dir: &Path) -> Result<(), String> {
    let expected: Expected = serde_json::from_str(&read_fixture(case_dir, "expected.json")?)
        .map_err(|err| format!("Invalid expected.json in '{}': {err}", case_dir.display()))?;
    let options = TableOptions {
        duplicate_keys: expected.duplicate_keys,
        label_field: expected.label_field,
    };
    let result = convert_tables(
        &read_fixture(case_dir, "segments")?,
        &read_fixture(case_dir, "wav.scp")?,
        &read_fixture(case_dir, "ctm")?,
        options,
    );

    match (result, expected.error) {
        (Ok(tiers), None) => compare_tiers(&tiers, &expected.tiers),
        (Err(err), Some(expected_error)) => compare_error(&err, &expected_error),
        (Ok(tiers), Some(expected_error)) => Err(format!(
            "expected {} error, got {} tier(s)",
            expected_error.kind,
            tiers.len()
        )),
        (Err(err), None) => Err(format!("unexpected error: {err}")),
    }
}

fn compare_tiers(actual: &[UtteranceTier], expected: &[ExpectedTier]) -> Result<(), String> {
    if actual.len() != expected.len() {
        return Err(format!(
            "tier count mismatch: got {}, expected {}",
            actual.len(),
            expected.len()
        ));
    }
    for (tier, want) in actual.iter().zip(expected) {
        if tier.utterance_id != want.utterance_id {
            return Err(format!(
                "tier order mismatch: got '{}', expected '{}'",
                tier.utterance_id, want.utterance_id
            ));
        }
        if tier.audio_path != want.audio_path {
            return Err(format!(
                "{}: audio path '{}' != '{}'",
                tier.utterance_id, tier.audio_path, want.audio_path
            ));
        }
        let intervals = tier.intervals().collect::<Vec<_>>();
        if intervals.len() != want.intervals.len() {
            return Err(format!(
                "{}: {} interval(s), expected {}",
                tier.utterance_id,
                intervals.len(),
                want.intervals.len()
            ));
        }
        for (idx, ((start, end, label), (want_start, want_end, want_label))) in
            intervals.iter().zip(&want.intervals).enumerate()
        {
            if (start - want_start).abs() > TIME_DELTA_SEC
                || (end - want_end).abs() > TIME_DELTA_SEC
                || label != want_label
            {
                return Err(format!(
                    "{} interval {idx}: got ({start}, {end}, '{label}'), expected ({want_start}, {want_end}, '{want_label}')",
                    tier.utterance_id
                ));
            }
        }
    }
    Ok(())
}

fn compare_error(actual: &ConversionError, expected: &ExpectedError) -> Result<(), String> {
    let (kind, key, line) = match actual {
        ConversionError::MalformedRecord { line, .. } => ("malformed_record", None, Some(*line)),
        ConversionError::UnresolvedKey { key, .. } => ("unresolved_key", Some(key.as_str()), None),
        ConversionError::DuplicateKey { key, line, .. } => {
            ("duplicate_key", Some(key.as_str()), Some(*line))
        }
        other => return Err(format!("unexpected error variant: {other}")),
    };
    if kind != expected.kind {
        return Err(format!("error kind '{kind}' != '{}' ({actual})", expected.kind));
    }
    if expected.key.is_some() && key != expected.key.as_deref() {
        return Err(format!("error key {key:?} != {:?}", expected.key));
    }
    if expected.line.is_some() && line != expected.line {
        return Err(format!("error line {line:?} != {:?}", expected.line));
    }
    Ok(())
}
