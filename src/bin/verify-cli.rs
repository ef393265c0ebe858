use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "verify-cli")]
#[command(about = "Command line client for the verification service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key, required for `status` and `reset`.
    #[arg(short, long, env = "VERIFY_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a value has been verified
    Lookup { value: String },
    /// Record a verified value
    Add {
        value: String,
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Show service status (admin)
    Status,
    /// Remove every verified record (admin)
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Lookup { value } => {
            let res = client
                .get(format!("{}/verify", cli.url))
                .query(&[("value", value)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Add { value, kind } => {
            let res = client
                .post(format!("{}/verify", cli.url))
                .json(&json!({ "value": value, "type": kind }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(admin_headers(cli.key.as_deref())?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reset => {
            let res = client
                .post(format!("{}/admin/reset", cli.url))
                .headers(admin_headers(cli.key.as_deref())?)
                .send()
                .await?;
            if res.status().is_success() {
                println!("Store reset");
            } else {
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

fn admin_headers(key: Option<&str>) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let key = key.ok_or("admin commands need --key or VERIFY_ADMIN_KEY")?;
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text.trim_end());
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
