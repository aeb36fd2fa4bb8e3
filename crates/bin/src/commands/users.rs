//! User listing command.

use crate::backend::create_backend;
use crate::cli::UsersArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the `users` command
///
/// Prints usernames only; password hashes stay in storage.
pub async fn run(args: &UsersArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let storage = create_backend(&args.storage).await?;

    let mut usernames: Vec<String> = storage.get_all_users().await?.into_keys().collect();
    usernames.sort();

    match format {
        OutputFormat::Human => {
            if usernames.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = usernames.into_iter().map(|u| vec![u]).collect();
            print_table(&["USERNAME"], &rows);
        }
        OutputFormat::Json => print_json(&usernames)?,
    }

    Ok(())
}
