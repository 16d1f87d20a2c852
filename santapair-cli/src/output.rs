/// Output formatting: terminal table and JSON.
use serde::Serialize;

/// One resolved assignment row, ready for display.
#[derive(Serialize)]
pub struct Row {
    pub scope: String,
    pub giver_id: i64,
    pub giver: String,
    pub recipient_id: i64,
    pub recipient: String,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    assignments: &'a [Row],
    total: usize,
}

/// Print assignments as a formatted terminal table.
pub fn print_table(rows: &[Row]) {
    // Find the widest entry per column for padding
    let scope_width = rows
        .iter()
        .map(|r| r.scope.len())
        .max()
        .unwrap_or(5)
        .max(5); // at least "Scope"
    let giver_width = rows
        .iter()
        .map(|r| r.giver.len())
        .max()
        .unwrap_or(5)
        .max(5); // at least "Giver"

    // Header
    println!("{:<scope_width$} | {:<giver_width$} | Recipient", "Scope", "Giver");
    println!(
        "{}-|-{}-|----------",
        "-".repeat(scope_width),
        "-".repeat(giver_width),
    );

    // Rows
    for r in rows {
        println!(
            "{:<scope_width$} | {:<giver_width$} | {}",
            r.scope, r.giver, r.recipient,
        );
    }

    println!("\n{} assignments stored", rows.len());
}

/// Print assignments as JSON.
pub fn print_json(rows: &[Row]) {
    let output = JsonOutput {
        assignments: rows,
        total: rows.len(),
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => crate::bail(format!("Failed to serialize output: {e}")),
    }
}
