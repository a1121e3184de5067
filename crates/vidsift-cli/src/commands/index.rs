//! Index command implementation
//!
//! Extracts signatures for every input in a directory in parallel and writes
//! them as a reference table.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vidsift_core::{retrieval, run_batch, Model};

use super::json_output::{error_codes, CommandOutput, IndexResult, JsonError};
use crate::extract::SignatureExtractor;
use crate::settings::CommonOptions;

/// Run the index command
///
/// # Arguments
/// * `model` - Model name
/// * `input_dir` - Directory holding one input per reference video
/// * `output` - Path of the reference table to write
/// * `options` - Shared configuration flags
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 when the table was written, 1 on error
pub fn run(
    model: &str,
    input_dir: &str,
    output: &str,
    options: &CommonOptions,
    json_output: bool,
) -> Result<ExitCode> {
    match build(model, input_dir, output, options) {
        Ok(result) if json_output => {
            let out = CommandOutput::success(result);
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(result) => {
            print_human(&result);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) if json_output => {
            let out: CommandOutput<IndexResult> = CommandOutput::failure(vec![error]);
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::from(1))
        }
        Err(error) => anyhow::bail!("[{}] {}", error.code, error.message),
    }
}

/// Builds and writes the reference table.
pub fn build(
    model: &str,
    input_dir: &str,
    output: &str,
    options: &CommonOptions,
) -> std::result::Result<IndexResult, JsonError> {
    let model: Model = model.parse().map_err(|e| JsonError::from_coded(&e))?;
    let config = options
        .resolve()
        .map_err(|e| JsonError::new(error_codes::CONFIG, format!("{:#}", e)))?;

    let dir = Path::new(input_dir);
    if !dir.is_dir() {
        return Err(JsonError::new(
            error_codes::INPUT,
            format!("Input directory not found: {}", input_dir),
        )
        .with_file(input_dir));
    }

    let extractor = SignatureExtractor::for_model(model, &config)
        .map_err(|e| JsonError::from_coded(&e))?;
    let inputs = extractor.discover_inputs(dir);
    if inputs.is_empty() {
        return Err(JsonError::new(
            error_codes::EMPTY_BATCH,
            format!("No {} inputs found in {}", model, input_dir),
        )
        .with_file(input_dir));
    }

    tracing::info!(model = %model, inputs = inputs.len(), "indexing");
    let report = run_batch(&inputs, |path| extractor.signature(path));
    if report.entries.is_empty() {
        let reasons: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.path.display(), f.reason))
            .collect();
        return Err(JsonError::new(
            error_codes::EMPTY_BATCH,
            format!("No input produced a signature ({})", reasons.join("; ")),
        )
        .with_file(input_dir));
    }

    let (corpus, failures) = report
        .into_corpus()
        .map_err(|e| JsonError::from_coded(&e))?;
    retrieval::check_corpus(model, &corpus).map_err(|e| JsonError::from_coded(&e))?;
    corpus.save(Path::new(output)).map_err(|e| {
        JsonError::new(
            error_codes::TABLE_WRITE,
            format!("Failed to write reference table: {}", e),
        )
        .with_file(output)
    })?;

    Ok(IndexResult {
        model: model.name().to_string(),
        output: output.to_string(),
        inputs: inputs.len(),
        entries: corpus.len(),
        failures,
    })
}

fn print_human(result: &IndexResult) {
    println!("{}", "Indexed:".cyan().bold());
    println!("  {} {}", "Model:".dimmed(), result.model);
    println!("  {} {}", "Table:".dimmed(), result.output);
    println!(
        "  {} {} of {}",
        "Entries:".dimmed(),
        result.entries.to_string().green(),
        result.inputs
    );

    if !result.failures.is_empty() {
        println!("\n{}", "Skipped:".yellow().bold());
        for failure in &result.failures {
            println!(
                "  {} {}",
                failure.path.display().to_string().yellow(),
                failure.reason.dimmed()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use vidsift_core::ReferenceCorpus;

    fn write_bundle(path: &Path, value: f64) {
        let data = vec![value.to_string(); 512].join(",");
        fs::write(
            path,
            format!(
                r#"{{"layers":{{"avgpool":{{"shape":[512],"data":[{}]}}}}}}"#,
                data
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_index_skips_failing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(&dir.path().join("a.json"), 1.0);
        write_bundle(&dir.path().join("b.json"), 2.0);
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        let table = dir.path().join("out.csv");

        let result = build(
            "R3D18-AvgPool-512",
            &dir.path().to_string_lossy(),
            &table.to_string_lossy(),
            &CommonOptions::default(),
        )
        .unwrap();

        assert_eq!(result.inputs, 3);
        assert_eq!(result.entries, 2);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].path.ends_with("broken.json"));

        let corpus = ReferenceCorpus::load(&table).unwrap();
        let ids: Vec<&str> = corpus.entries().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_index_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = build(
            "R3D18-AvgPool-512",
            &dir.path().to_string_lossy(),
            &dir.path().join("out.csv").to_string_lossy(),
            &CommonOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, error_codes::EMPTY_BATCH);
    }

    #[test]
    fn test_index_all_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        let err = build(
            "R3D18-AvgPool-512",
            &dir.path().to_string_lossy(),
            &dir.path().join("out.csv").to_string_lossy(),
            &CommonOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, error_codes::EMPTY_BATCH);
        assert!(err.message.contains("broken.json"));
    }
}
