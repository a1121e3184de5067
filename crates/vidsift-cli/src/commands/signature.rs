//! Signature command implementation
//!
//! Computes the stored signature of one input under one model.

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use vidsift_core::Model;

use super::json_output::{error_codes, CommandOutput, JsonError, SignatureResult};
use crate::extract::SignatureExtractor;
use crate::settings::CommonOptions;

/// Run the signature command
///
/// # Arguments
/// * `model` - Model name (e.g., "COL-HIST", "BOF-960")
/// * `input` - Descriptor file, frame directory or activation bundle
/// * `options` - Shared configuration flags
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(
    model: &str,
    input: &str,
    options: &CommonOptions,
    json_output: bool,
) -> Result<ExitCode> {
    match compute(model, input, options) {
        Ok(result) if json_output => {
            let output = CommandOutput::success(result);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(result) => {
            print_human(&result);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) if json_output => {
            let output: CommandOutput<SignatureResult> = CommandOutput::failure(vec![error]);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::from(1))
        }
        Err(error) => anyhow::bail!("[{}] {}", error.code, error.message),
    }
}

/// Extracts the signature, mapping every failure to a coded error.
pub fn compute(
    model: &str,
    input: &str,
    options: &CommonOptions,
) -> std::result::Result<SignatureResult, JsonError> {
    let model: Model = model.parse().map_err(|e| JsonError::from_coded(&e))?;
    let config = options
        .resolve()
        .map_err(|e| JsonError::new(error_codes::CONFIG, format!("{:#}", e)))?;

    let path = Path::new(input);
    if !path.exists() {
        return Err(
            JsonError::new(error_codes::INPUT, format!("Input not found: {}", input))
                .with_file(input),
        );
    }

    let extractor = SignatureExtractor::for_model(model, &config)
        .map_err(|e| JsonError::from_coded(&e))?;
    let signature = extractor
        .signature(path)
        .map_err(|e| JsonError::from_coded(&e).with_file(input))?;

    let input_hash = if path.is_file() {
        fs::read(path)
            .ok()
            .map(|data| blake3::hash(&data).to_hex().to_string())
    } else {
        None
    };

    Ok(SignatureResult {
        model: model.name().to_string(),
        input: input.to_string(),
        input_hash,
        length: signature.len(),
        signature,
    })
}

fn print_human(result: &SignatureResult) {
    println!("{}", "Signature:".cyan().bold());
    println!("  {} {}", "Model:".dimmed(), result.model);
    println!("  {} {}", "Input:".dimmed(), result.input);
    if let Some(hash) = &result.input_hash {
        println!("  {} {}", "Hash:".dimmed(), &hash[..16]);
    }
    println!("  {} {}", "Length:".dimmed(), result.length);

    let values: Vec<String> = result.signature.iter().map(|v| format!("{:.5}", v)).collect();
    println!("{}", values.join(" "));
}
