//! Output renderers for CLI commands.

use albamate_cache::CachedList;
use albamate_core::{AlbaDetail, AlbaSummary};
use albamate_events::NoticeEnvelope;
use anyhow::anyhow;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

fn to_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn scrap_cell(is_scrapped: Option<bool>, scrap_count: Option<u32>) -> String {
    match (is_scrapped, scrap_count) {
        (Some(true), count) => format!("* {}", count.unwrap_or(0)),
        (Some(false), count) => format!("  {}", count.unwrap_or(0)),
        _ => "  -".to_string(),
    }
}

pub(crate) fn render_summaries(items: &[AlbaSummary], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&items)?),
        OutputFormat::Table => {
            println!("{:>8} {:<30} {:<12} {:>8} {:>7} TITLE", "ID", "WORKPLACE", "WAGE", "APPLIED", "SCRAPS");
            for item in items {
                println!(
                    "{:>8} {:<30} {:<12} {:>8} {:>7} {}",
                    item.id,
                    item.workplace,
                    item.wage,
                    item.application_count,
                    scrap_cell(item.is_scrapped, item.scrap_count),
                    item.title
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_list(list: &CachedList, format: OutputFormat) -> CliResult<()> {
    let items: Vec<AlbaSummary> = list
        .pages
        .iter()
        .flat_map(|page| page.items.iter().cloned())
        .collect();
    render_summaries(&items, format)?;
    if format == OutputFormat::Table {
        if let Some(next) = list.next_cursor() {
            println!("next cursor: {next}");
        }
    }
    Ok(())
}

pub(crate) fn render_detail(detail: &AlbaDetail, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(detail)?),
        OutputFormat::Table => {
            println!("{} — {}", detail.id, detail.title);
            println!("workplace:    {}", detail.workplace);
            println!("wage:         {} won/h", detail.wage);
            println!(
                "recruiting:   {} → {}",
                detail.recruitment_start.date_naive(),
                detail.recruitment_end.date_naive()
            );
            println!("applications: {}", detail.application_count);
            println!(
                "scraps:       {}{}",
                detail.scrap_count,
                if detail.is_scrapped { " (scrapped by you)" } else { "" }
            );
            if let Some(preferred) = &detail.preferred {
                println!("preferred:    {preferred}");
            }
            println!();
            println!("{}", detail.description);
        }
    }
    Ok(())
}

pub(crate) fn render_notices(notices: &[NoticeEnvelope]) {
    for envelope in notices {
        match &envelope.notice {
            albamate_events::Notice::ScrapAdded { form_id } => {
                println!("scrapped form {form_id}");
            }
            albamate_events::Notice::ScrapRemoved { form_id } => {
                println!("removed scrap from form {form_id}");
            }
            albamate_events::Notice::ScrapCorrected { form_id } => {
                println!("form {form_id} was already scrapped; removed it instead");
            }
            albamate_events::Notice::ToggleFailed { form_id, message } => {
                println!("scrap toggle for form {form_id} failed: {message}");
            }
            albamate_events::Notice::SessionExpired => {
                println!("session expired, please sign in again");
            }
        }
    }
}
