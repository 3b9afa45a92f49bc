use super::ui;
use crate::core::query::CountryQuery;
use crate::store::{CountryRow, CountryStore};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;

const TOP_COUNT: usize = 5;

pub fn countries_table(rows: &[CountryRow]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Capital"),
        ui::header_cell("Region"),
        ui::header_cell("Population"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
        ui::header_cell("Est. GDP"),
    ]);

    for row in rows {
        let record = &row.record;
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(record.capital.as_deref().unwrap_or("")),
            Cell::new(record.region.as_deref().unwrap_or("")),
            ui::number_cell(ui::format_count(record.population)),
            Cell::new(record.currency_code.as_deref().unwrap_or("")),
            ui::format_optional_cell(record.exchange_rate, |r| format!("{r:.4}")),
            ui::number_cell(ui::format_amount(record.estimated_gdp)),
        ]);
    }
    table.to_string()
}

fn detail_table(row: &CountryRow) -> String {
    let record = &row.record;
    let na = || "N/A".to_string();

    let mut table = ui::new_styled_table();
    let fields = [
        ("Capital", record.capital.clone().unwrap_or_else(na)),
        ("Region", record.region.clone().unwrap_or_else(na)),
        ("Population", ui::format_count(record.population)),
        ("Currency", record.currency_code.clone().unwrap_or_else(na)),
        (
            "Exchange rate",
            record.exchange_rate.map_or_else(na, |r| format!("{r}")),
        ),
        ("Estimated GDP", ui::format_amount(record.estimated_gdp)),
        ("Flag", record.flag_url.clone().unwrap_or_else(na)),
        ("Last refreshed", record.last_refreshed_at.to_rfc3339()),
        ("Created", row.created_at.to_rfc3339()),
        ("Updated", row.updated_at.to_rfc3339()),
    ];
    for (label, value) in fields {
        table.add_row(vec![ui::header_cell(label), Cell::new(value)]);
    }
    table.to_string()
}

pub async fn list(store: &dyn CountryStore, query: &CountryQuery, as_json: bool) -> Result<()> {
    let rows = store.list(query).await.context("Failed to list countries")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!(
            "{}",
            ui::style_text("No countries found. Run `countryfx refresh` first?", ui::StyleType::Subtle)
        );
    } else {
        println!("{}", countries_table(&rows));
        println!("{} countries", rows.len());
    }
    Ok(())
}

pub async fn show(store: &dyn CountryStore, name: &str) -> Result<()> {
    let Some(row) = store
        .get(name)
        .await
        .with_context(|| format!("Failed to read country: {name}"))?
    else {
        bail!("Country not found: {name}");
    };

    println!(
        "Country: {}\n",
        ui::style_text(&row.record.name, ui::StyleType::Title)
    );
    println!("{}", detail_table(&row));
    Ok(())
}

pub async fn delete(store: &dyn CountryStore, name: &str) -> Result<()> {
    let deleted = store
        .delete(name)
        .await
        .with_context(|| format!("Failed to delete country: {name}"))?;
    if !deleted {
        bail!("Country not found: {name}");
    }
    tracing::info!("Deleted country {}", name);
    println!("Deleted {name}");
    Ok(())
}

pub async fn status(store: &dyn CountryStore) -> Result<()> {
    let status = store.status().await.context("Failed to read store status")?;
    let last_refreshed = status
        .last_refreshed_at
        .map_or("never".to_string(), |t| t.to_rfc3339());

    println!(
        "{} {}",
        ui::style_text("Total countries:", ui::StyleType::TotalLabel),
        ui::style_text(&status.total_countries.to_string(), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Last refreshed:", ui::StyleType::TotalLabel),
        last_refreshed
    );
    Ok(())
}

/// Country count plus the largest economies by estimated GDP.
pub async fn summary(store: &dyn CountryStore) -> Result<()> {
    let status = store.status().await.context("Failed to read store status")?;
    let top = store
        .top_by_gdp(TOP_COUNT)
        .await
        .context("Failed to read top countries")?;

    println!(
        "{}\n",
        ui::style_text("Country summary", ui::StyleType::Title)
    );
    println!(
        "{} {}\n",
        ui::style_text("Total countries:", ui::StyleType::TotalLabel),
        ui::style_text(&status.total_countries.to_string(), ui::StyleType::TotalValue)
    );

    if top.is_empty() {
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Country"),
        ui::header_cell("Est. GDP"),
    ]);
    for (rank, row) in top.iter().enumerate() {
        table.add_row(vec![
            ui::number_cell((rank + 1).to_string()),
            Cell::new(&row.record.name),
            ui::number_cell(ui::format_amount(row.record.estimated_gdp)),
        ]);
    }
    println!("Top {} by estimated GDP:\n{}", top.len(), table);
    Ok(())
}
