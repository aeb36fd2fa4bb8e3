//! Health check command - checks a running wikilog server.

use std::time::Duration;

use crate::cli::HealthArgs;

/// Health endpoint URL for a server base URL (or the endpoint itself)
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            std::process::exit(1);
        }
    };

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let reported = body.get("status").and_then(|s| s.as_str()).unwrap_or("");

    if status.is_success() && reported == "healthy" {
        println!("healthy: {body}");
        return Ok(());
    }

    match body.get("error").and_then(|e| e.as_str()) {
        Some(error) => eprintln!("unhealthy: HTTP {status}: {error}"),
        None => eprintln!("unhealthy: HTTP {status}, status {reported:?}"),
    }
    std::process::exit(1);
}
