use super::ui;
use crate::core::refresh::{RefreshError, RefreshSummary, Refresher};
use anyhow::Result;
use comfy_table::Cell;

impl RefreshSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Processed"),
            ui::header_cell("New"),
            ui::header_cell("Updated"),
            ui::header_cell("Errors"),
        ]);
        table.add_row(vec![
            ui::number_cell(self.total_processed.to_string()),
            ui::number_cell(self.saved.to_string()),
            ui::number_cell(self.updated.to_string()),
            ui::number_cell(self.errors.len().to_string()),
        ]);

        let mut output = format!(
            "Refresh completed at {}\n\n",
            ui::style_text(&self.completed_at.to_rfc3339(), ui::StyleType::TotalLabel)
        );
        output.push_str(&table.to_string());

        if self.is_partial() {
            let mut errors = ui::new_styled_table();
            errors.set_header(vec![ui::header_cell("Country"), ui::header_cell("Error")]);
            for error in &self.errors {
                errors.add_row(vec![Cell::new(error.name()), Cell::new(error.to_string())]);
            }
            output.push_str(&format!(
                "\n\n{}\n",
                ui::style_text("Some countries were skipped:", ui::StyleType::Warning)
            ));
            output.push_str(&errors.to_string());
        }
        output
    }
}

pub async fn run(refresher: &Refresher, as_json: bool) -> Result<()> {
    let pb = ui::new_spinner("Refreshing countries...");
    let result = refresher.refresh_all().await;
    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.display_as_table());
            }
            Ok(())
        }
        Err(err) => {
            let RefreshError::SourceUnavailable { cause, .. } = &err;
            eprintln!(
                "{}: {}",
                ui::style_text("External data source unavailable", ui::StyleType::Error),
                cause
            );
            Err(err.into())
        }
    }
}
