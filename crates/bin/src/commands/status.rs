//! Storage status command - which variables are set and which backend they select.

use wikilog::{ProcessEnv, config};

use crate::backend::plan_backend;
use crate::cli::StatusArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the status command
///
/// Never opens the backend and never prints variable values or tokens.
pub fn run(args: &StatusArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let variables = config::redis_status(&ProcessEnv);
    let plan = plan_backend(&args.storage);

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = variables
                .iter()
                .map(|(name, state)| vec![name.to_string(), state.as_str().to_string()])
                .collect();
            print_table(&["VARIABLE", "STATE"], &rows);
            println!();
            match &plan {
                Ok(plan) => println!("Backend:     {} ({plan})", plan.kind()),
                Err(e) => println!("Backend:     none\nError:       {e}"),
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "variables": config::redis_status_json(&ProcessEnv),
                "backend": plan.as_ref().ok().map(|p| p.kind().to_string()),
                "target": plan.as_ref().ok().map(|p| p.to_string()),
                "error": plan.as_ref().err().map(|e| e.to_string()),
            });
            print_json(&value)?;
        }
    }

    Ok(())
}
