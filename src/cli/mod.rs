use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::kitt::KittApi;
use crate::domain::{FindEmailRequest, JobResponse, JobStatusQuery, VerifyEmailRequest};
use crate::infra::config::{Config, KittConfig};

#[derive(Parser)]
#[command(name = "kitt-mcp-gateway")]
#[command(about = "TryKitt.ai MCP gateway - server and admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (stdio or HTTP, per MODE)
    Serve,
    /// Health check a running HTTP-mode server
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Show the resolved configuration, or check it with --validate
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Submit an email verification job and print the upstream response
    VerifyEmail {
        email: String,
        #[arg(long)]
        custom_data: Option<String>,
    },
    /// Submit a find-email job and print the upstream response
    FindEmail {
        full_name: String,
        domain: String,
        #[arg(long)]
        linkedin_url: Option<String>,
        #[arg(long)]
        custom_data: Option<String>,
    },
    /// Print the status of a job
    JobStatus { job_id: String },
    /// Print the job list
    ListJobs,
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Server exited with error: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: false } => match render_config() {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Could not load configuration: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: true } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        other => match run_job_command(other).await {
            Ok(out) => match serde_json::to_string_pretty(&out) {
                Ok(s) => {
                    println!("{s}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Could not render response: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("❌ Request failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env();
    if !matches!(cfg.mode.as_str(), "server" | "stdio") {
        return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", cfg.mode).into());
    }
    if cfg.mode == "server" && cfg.port == 0 {
        return Err("PORT cannot be 0".into());
    }

    let kitt = KittConfig::from_env_and_toml()?;
    kitt.validate()?;
    if kitt.api_key.is_none() {
        eprintln!("⚠️  TRYKITT_API_KEY not set; requests will be unauthenticated");
    }
    if kitt.insecure_tls {
        eprintln!("⚠️  TLS certificate verification is disabled");
    }
    Ok(())
}

/// Resolved configuration, with the API key redacted.
fn render_config() -> Result<String, Box<dyn std::error::Error>> {
    let cfg = Config::from_env();
    let kitt = KittConfig::from_env_and_toml()?;
    Ok(format!(
        "📋 Configuration:\n  Mode: {}\n  Port: {}\n  Upstream: {}\n  API key: {}\n  TLS verification: {}\n  Timeout: {}s",
        cfg.mode,
        cfg.port,
        kitt.base_url,
        if kitt.api_key.is_some() { "set" } else { "not set" },
        if kitt.insecure_tls { "DISABLED" } else { "enabled" },
        kitt.timeout_secs,
    ))
}

async fn run_job_command(command: Commands) -> Result<JobResponse, Box<dyn std::error::Error>> {
    let kitt = KittConfig::from_env_and_toml()?;
    let api = crate::infra::boot::build_api(&kitt)?;
    run_job_command_with(api.as_ref(), command).await
}

async fn run_job_command_with(
    api: &dyn KittApi,
    command: Commands,
) -> Result<JobResponse, Box<dyn std::error::Error>> {
    let out = match command {
        Commands::VerifyEmail { email, custom_data } => {
            api.verify_email(&VerifyEmailRequest::new(email, custom_data)?).await?
        }
        Commands::FindEmail { full_name, domain, linkedin_url, custom_data } => {
            let req = FindEmailRequest::new(full_name, domain, linkedin_url, custom_data)?;
            api.find_email(&req).await?
        }
        Commands::JobStatus { job_id } => api.job_status(&JobStatusQuery::new(job_id)?).await?,
        Commands::ListJobs => api.list_jobs().await?,
        Commands::Serve | Commands::Health { .. } | Commands::Config { .. } => {
            return Err("not a job command".into())
        }
    };
    Ok(out)
}
