//! Search command implementation
//!
//! Ranks a reference table against a query video, given either as a raw
//! input (its signature is computed on the fly) or as the identifier of an
//! entry already in the table.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vidsift_core::{retrieval, Model, Query, ReferenceCorpus};

use super::json_output::{error_codes, CommandOutput, JsonError, RankedNeighbor, SearchResult};
use crate::extract::SignatureExtractor;
use crate::settings::CommonOptions;

/// Arguments of the search command.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub model: String,
    /// Reference table written by `index`
    pub table: String,
    /// Raw query input
    pub input: Option<String>,
    /// Identifier of a table entry to use as the query
    pub query_id: Option<String>,
    pub k: usize,
}

/// Run the search command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(args: &SearchArgs, options: &CommonOptions, json_output: bool) -> Result<ExitCode> {
    match search(args, options) {
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
            let output: CommandOutput<SearchResult> = CommandOutput::failure(vec![error]);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::from(1))
        }
        Err(error) => anyhow::bail!("[{}] {}", error.code, error.message),
    }
}

/// Loads the table and ranks it against the query.
pub fn search(
    args: &SearchArgs,
    options: &CommonOptions,
) -> std::result::Result<SearchResult, JsonError> {
    let model: Model = args.model.parse().map_err(|e| JsonError::from_coded(&e))?;

    let corpus = ReferenceCorpus::load(Path::new(&args.table)).map_err(|e| {
        JsonError::new(
            error_codes::TABLE_READ,
            format!("Failed to read reference table: {}", e),
        )
        .with_file(&args.table)
    })?;

    let (neighbors, query) = match (&args.input, &args.query_id) {
        (Some(input), None) => {
            let path = Path::new(input);
            if !path.exists() {
                return Err(JsonError::new(
                    error_codes::INPUT,
                    format!("Input not found: {}", input),
                )
                .with_file(input));
            }
            let config = options
                .resolve()
                .map_err(|e| JsonError::new(error_codes::CONFIG, format!("{:#}", e)))?;
            let signature = SignatureExtractor::for_model(model, &config)
                .and_then(|extractor| extractor.signature(path))
                .map_err(|e| JsonError::from_coded(&e).with_file(input))?;
            let neighbors =
                retrieval::search(Query::Signature(&signature), model, &corpus, args.k)
                    .map_err(|e| JsonError::from_coded(&e))?;
            (neighbors, input.clone())
        }
        (None, Some(identifier)) => {
            let neighbors = retrieval::search(Query::Reference(identifier), model, &corpus, args.k)
                .map_err(|e| JsonError::from_coded(&e))?;
            (neighbors, identifier.clone())
        }
        _ => {
            return Err(JsonError::new(
                error_codes::QUERY,
                "Exactly one of --input or --query-id is required",
            ))
        }
    };

    Ok(SearchResult {
        model: model.name().to_string(),
        metric: model.metric().as_str().to_string(),
        table: args.table.clone(),
        query,
        k: args.k,
        neighbors: neighbors
            .into_iter()
            .enumerate()
            .map(|(i, n)| RankedNeighbor {
                rank: i + 1,
                identifier: n.identifier,
                distance: n.distance,
            })
            .collect(),
    })
}

fn print_human(result: &SearchResult) {
    println!("{}", "Search:".cyan().bold());
    println!("  {} {}", "Model:".dimmed(), result.model);
    println!("  {} {}", "Metric:".dimmed(), result.metric);
    println!("  {} {}", "Query:".dimmed(), result.query);

    println!("\n{}", "Neighbors:".cyan().bold());
    for neighbor in &result.neighbors {
        println!(
            "  {:>4}  {:<40} {:.6}",
            neighbor.rank,
            neighbor.identifier.green(),
            neighbor.distance
        );
    }
}
