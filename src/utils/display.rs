use anyhow::Result;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color as TableColor, ContentArrangement, Table};
use serde::Serialize;

use crate::api::{DocumentRef, JobResults};
use crate::config::OutputFormat;
use crate::flows::{AnalysisView, QueryView};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_analysis(view: &AnalysisView, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(view);
    }

    println!("\n{}", "📊 AI Analysis Result:".green().bold());
    println!("{}", indent(&view.text));

    if let Some(link) = &view.dashboard {
        println!("\n{} {}", "🔍 AgentOps Dashboard:".blue().bold(), link.underline());
    }

    Ok(())
}

pub fn print_query(view: &QueryView, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(view);
    }

    println!("\n{}", "📝 Answer:".green().bold());
    println!("{}", indent(&view.answer));

    if let Some(logs) = &view.logs {
        println!("\n{}", "AgentOps Logs:".bright_black().bold());
        println!("{}", indent(logs).bright_black());
    }

    Ok(())
}

pub fn print_documents(documents: &[DocumentRef], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&documents);
    }

    if documents.is_empty() {
        println!(
            "\n{}",
            "No documents found. Upload one with 'finadvisor document upload <file>'".yellow()
        );
        return Ok(());
    }

    println!(
        "\n{} {}",
        "📄".cyan(),
        format!("Your Documents ({} total):", documents.len()).bold()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Filename"]);

    for doc in documents {
        table.add_row(vec![
            Cell::new(doc.id.to_string()).fg(TableColor::Yellow),
            Cell::new(&doc.filename),
        ]);
    }

    println!("{}", table);
    Ok(())
}

pub fn print_job_results(results: &JobResults, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(results);
    }

    let status = results.status.as_deref().unwrap_or("unknown");
    let status_display = match status.to_lowercase().as_str() {
        "completed" | "done" | "success" => status.green(),
        "failed" | "error" => status.red(),
        _ => status.yellow(),
    };
    println!("\n{} {}", "📊 Status:".bold(), status_display);

    if let Some(summary) = &results.summary {
        println!("\n{}", "📝 Summary:".green().bold());
        println!("{}", indent(summary));
    }

    if let Some(logs) = &results.logs {
        println!("\n{}", "Logs:".bright_black().bold());
        println!("{}", indent(logs).bright_black());
    }

    Ok(())
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
