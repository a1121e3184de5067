//! Models command implementation
//!
//! Lists every retrieval model with the signature it reads and the distance
//! it scores with.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use vidsift_core::{Model, SignatureKind};

use super::json_output::{CommandOutput, ModelInfo};

/// Run the models command
pub fn run(json_output: bool) -> Result<ExitCode> {
    let models = model_infos();

    if json_output {
        let output = CommandOutput::success(models);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Models:".cyan().bold());
    for info in &models {
        let len = info
            .signature_len
            .map(|l| l.to_string())
            .unwrap_or_else(|| "config".to_string());
        println!(
            "  {:<24} {:<24} {:<18} {}",
            info.name.green(),
            info.metric,
            info.signature,
            len.dimmed()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn signature_label(kind: SignatureKind) -> String {
    match kind {
        SignatureKind::ColorGrid => "color grid".to_string(),
        SignatureKind::BagOfFeatures => "bag of features".to_string(),
        SignatureKind::Deep(layer) => format!("deep {}", layer),
    }
}

fn model_infos() -> Vec<ModelInfo> {
    Model::ALL
        .into_iter()
        .map(|model| ModelInfo {
            name: model.name().to_string(),
            metric: model.metric().display_name().to_string(),
            signature: signature_label(model.signature_kind()),
            signature_len: model.stored_len(),
        })
        .collect()
}
