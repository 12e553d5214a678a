use bidmatch::workflows::catalog::{CatalogItem, PropertyKind};
use bidmatch::workflows::matching::{EngineSnapshot, LogEntry, RunStatus};

pub(crate) fn print_log_entry(entry: &LogEntry) {
    println!(
        "[{}] {:<7} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.severity.label(),
        entry.message
    );
}

pub(crate) fn render_run(snapshot: &EngineSnapshot, status: &RunStatus) {
    println!("\nRun status: {}", status_label(status));
    println!("Final phase: {}", snapshot.phase);

    if !snapshot.step_history.is_empty() {
        println!("\nStage summary");
        for step in &snapshot.step_history {
            println!(
                "  {:<28} in={:>3} passed={:>3} eliminated={:>3}",
                step.stage.label(),
                step.input_len(),
                step.survivors.len(),
                step.eliminated.len()
            );
        }
    }

    let eliminations: Vec<_> = snapshot
        .step_history
        .iter()
        .flat_map(|step| step.eliminated.iter().map(move |entry| (step.stage, entry)))
        .collect();
    if !eliminations.is_empty() {
        println!("\nEliminations");
        for (stage, entry) in eliminations {
            println!(
                "  - {} ({}) at {}: {}",
                entry.candidate.id,
                entry.candidate.title,
                stage.label(),
                entry.reason
            );
        }
    }

    if !snapshot.quotes.is_empty() {
        println!("\nQuotes");
        for quote in &snapshot.quotes {
            println!(
                "  - {} -> {} [{}]: {} total",
                quote.candidate_id,
                quote.product_name,
                quote.sku,
                format_amount(quote.pricing.total_cost)
            );
        }
    }

    match &snapshot.final_selection {
        Some(selection) => {
            println!("\nFinal selection");
            println!(
                "  {} ({}) with {} [{}]",
                selection.candidate.title,
                selection.candidate.id,
                selection.item.product_name,
                selection.item.sku
            );
            println!("  Match score: {}%", selection.match_score);
            println!("  {}", selection.justification);
            for line in &selection.pricing.line_items {
                println!("    {:<40} {:>14}", line.item, format_amount(line.cost));
            }
            println!(
                "    {:<40} {:>14}",
                "Total",
                format_amount(selection.total_cost)
            );
        }
        None => println!("\nNo final selection was produced."),
    }
}

pub(crate) fn render_catalog(items: &[CatalogItem]) {
    println!("Catalog ({} items)", items.len());
    for item in items {
        println!(
            "  {:<26} {:<40} {:>8.2}/unit  {}",
            item.sku,
            item.product_name,
            item.cost_per_unit,
            rating_summary(item)
        );
        if !item.compliance.is_empty() {
            println!("    standards: {}", item.compliance.join(", "));
        }
    }
}

fn rating_summary(item: &CatalogItem) -> String {
    PropertyKind::ALL
        .iter()
        .map(|kind| format!("{}: {}", kind.label(), item.rating(*kind)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_label(status: &RunStatus) -> String {
    match status {
        RunStatus::Completed => "completed".to_string(),
        RunStatus::Rejected(reason) => format!("rejected ({reason:?})"),
        RunStatus::Failed(message) => format!("failed: {message}"),
        RunStatus::Abandoned => "abandoned".to_string(),
    }
}

/// Whole-currency amount with thousands separators.
pub(crate) fn format_amount(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
