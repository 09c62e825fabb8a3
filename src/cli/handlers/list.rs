//! `list`: table of local models.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eyre::Result;
use indicatif::{HumanBytes, HumanDuration};
use ollama::api::{ListResponse, ModelService};

const HEADERS: [&str; 3] = ["NAME", "SIZE", "MODIFIED"];
const COLUMN_GAP: usize = 4;

pub async fn list_models<S, W>(service: &S, out: &mut W) -> Result<()>
where
    S: ModelService + ?Sized,
    W: Write,
{
    let list = service.list().await?;
    log::debug!("Listing {} models", list.models.len());
    out.write_all(render_models(&list, Utc::now()).as_bytes())?;
    Ok(())
}

/// Render `list` in server order, with ages relative to `now`
pub fn render_models(list: &ListResponse, now: DateTime<Utc>) -> String {
    let rows: Vec<[String; 3]> = list
        .models
        .iter()
        .map(|m| {
            // Clock skew can put modified_at in the future
            let age = (now - m.modified_at).to_std().unwrap_or(Duration::ZERO);
            [
                m.name.clone(),
                HumanBytes(m.size).to_string(),
                format!("{} ago", HumanDuration(age)),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    let header = HEADERS.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line = format!(
            "{:<name$}{:gap$}{:<size$}{:gap$}{}",
            row[0],
            "",
            row[1],
            "",
            row[2],
            name = widths[0],
            size = widths[1],
            gap = COLUMN_GAP,
        );
        table.push_str(line.trim_end());
        table.push('\n');
    }

    table
}
