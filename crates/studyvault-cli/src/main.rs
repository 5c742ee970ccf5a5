//! StudyVault CLI: review queue and catalog administration over the HTTP API.
//!
//! Set STUDYVAULT_API_URL (or API_URL); defaults to http://localhost:3000.
//! Queue and admin commands need MODERATOR_API_KEY.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use studyvault_cli::{format_size, init_tracing, truncate_string, ApiClient};
use studyvault_core::models::{ResourceResponse, SubmissionResponse};
use studyvault_core::Decision;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "studyvault", about = "StudyVault moderation CLI")]
struct Cli {
    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List submissions awaiting review, newest first
    Pending {
        #[arg(long, default_value = "20")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show one submission with its classifier verdict
    Show {
        /// Submission UUID
        id: Uuid,
    },
    /// Approve a pending submission and publish it
    Approve {
        /// Submission UUID
        id: Uuid,
        #[arg(long)]
        reviewer: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Reject a pending submission; its staged file is deleted
    Reject {
        /// Submission UUID
        id: Uuid,
        /// Reason recorded on the submission
        #[arg(long)]
        note: String,
        #[arg(long)]
        reviewer: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Search published resources
    Resources {
        #[arg(long)]
        search: Option<String>,
        /// question-paper, study-material, lab-manual or all
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Count a download and print the resource URL
    Download {
        /// Resource UUID
        id: Uuid,
    },
    /// Catalog statistics
    Stats,
    /// Delete a published resource and its file
    Delete {
        /// Resource UUID
        id: Uuid,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_pending(items: &[SubmissionResponse]) {
    if items.is_empty() {
        println!("No submissions awaiting review.");
        return;
    }
    println!(
        "{:<36}  {:<30}  {:<18}  {:<14}  {:>6}  {:>9}",
        "ID", "TITLE", "DEPARTMENT", "CATEGORY", "CONF", "SIZE"
    );
    println!("{}", "-".repeat(124));
    for s in items {
        let confidence = s
            .verdict
            .as_ref()
            .map(|v| format!("{}%", v.confidence))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36}  {:<30}  {:<18}  {:<14}  {:>6}  {:>9}",
            s.id,
            truncate_string(&s.title, 30),
            truncate_string(&s.department, 18),
            s.category.as_str(),
            confidence,
            format_size(s.file_size),
        );
    }
}

fn print_submission(s: &SubmissionResponse) {
    println!("ID:          {}", s.id);
    println!("Title:       {}", s.title);
    println!("Subject:     {}", s.subject);
    println!("Department:  {}", s.department);
    println!("Category:    {}", s.category);
    println!("Submitter:   {}", s.submitter);
    println!("File:        {} ({})", s.file_name, format_size(s.file_size));
    println!("Status:      {}", s.status);
    println!("Submitted:   {}", s.created_at.format("%Y-%m-%d %H:%M UTC"));
    match &s.verdict {
        Some(v) => {
            println!(
                "Verdict:     study_related={} confidence={}%",
                v.is_study_related, v.confidence
            );
            println!("Summary:     {}", v.summary);
            println!("Reasoning:   {}", v.reasoning);
        }
        None => println!("Verdict:     (not classified)"),
    }
    if let Some(url) = &s.url {
        println!("URL:         {}", url);
    }
    if let Some(note) = &s.review_note {
        println!("Note:        {}", note);
    }
}

fn print_resources(items: &[ResourceResponse]) {
    if items.is_empty() {
        println!("No published resources match.");
        return;
    }
    println!(
        "{:<36}  {:<32}  {:<18}  {:<14}  {:>9}",
        "ID", "TITLE", "DEPARTMENT", "CATEGORY", "DOWNLOADS"
    );
    println!("{}", "-".repeat(117));
    for r in items {
        println!(
            "{:<36}  {:<32}  {:<18}  {:<14}  {:>9}",
            r.id,
            truncate_string(&r.title, 32),
            truncate_string(&r.department, 18),
            r.category.as_str(),
            r.download_count,
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::from_env().context("Failed to create API client")?;
    tracing::debug!(base_url = %client.base_url(), "Using API");

    let needs_key = !matches!(
        cli.command,
        Commands::Show { .. } | Commands::Resources { .. } | Commands::Download { .. }
    );
    if needs_key && !client.has_api_key() {
        bail!("MODERATOR_API_KEY must be set for moderation and admin commands");
    }

    match cli.command {
        Commands::Pending { limit, offset } => {
            let items = client.list_pending(limit, offset).await?;
            if cli.json {
                print_json(&items)?;
            } else {
                print_pending(&items);
            }
        }
        Commands::Show { id } => {
            let submission = client.get_submission(id).await?;
            if cli.json {
                print_json(&submission)?;
            } else {
                print_submission(&submission);
            }
        }
        Commands::Approve { id, reviewer, note } => {
            let submission = client
                .decide(id, Decision::Approve, note.as_deref(), reviewer.as_deref())
                .await?;
            if cli.json {
                print_json(&submission)?;
            } else {
                println!("Published {}", submission.id);
                if let Some(url) = &submission.url {
                    println!("{}", url);
                }
            }
        }
        Commands::Reject {
            id,
            note,
            reviewer,
            yes,
        } => {
            if note.trim().is_empty() {
                bail!("--note must not be empty");
            }
            if !yes && !confirm(&format!("Reject {} and delete its file?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            let submission = client
                .decide(id, Decision::Reject, Some(&note), reviewer.as_deref())
                .await?;
            if cli.json {
                print_json(&submission)?;
            } else {
                println!("Rejected {}", submission.id);
            }
        }
        Commands::Resources {
            search,
            category,
            limit,
        } => {
            let items = client
                .list_resources(search.as_deref(), category.as_deref(), limit)
                .await?;
            if cli.json {
                print_json(&items)?;
            } else {
                print_resources(&items);
            }
        }
        Commands::Download { id } => {
            let download = client.record_download(id).await?;
            if cli.json {
                print_json(&download)?;
            } else {
                println!("{}", download.url);
            }
        }
        Commands::Stats => {
            let stats = client.stats().await?;
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("Published:          {}", stats.total_published);
                println!("Downloads:          {}", stats.total_downloads);
                println!("Unique submitters:  {}", stats.unique_submitters);
                println!("Published (7 days): {}", stats.published_last_7_days);
                println!("Pending review:     {}", stats.pending_review);
            }
        }
        Commands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete resource {} and its file?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            client.delete_resource(id).await?;
            if cli.json {
                print_json(&serde_json::json!({ "success": true, "id": id }))?;
            } else {
                println!("Deleted {}", id);
            }
        }
    }

    Ok(())
}
