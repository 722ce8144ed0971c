use super::ui;
use crate::core::ConversionRecord;
use crate::store::HistoryStore;
use anyhow::Result;
use comfy_table::Cell;

/// Renders stored conversions as a table.
pub fn display_as_table(records: &[ConversionRecord]) -> String {
    if records.is_empty() {
        return ui::style_text("No conversions recorded yet.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
        ui::header_cell("From"),
        ui::header_cell("Converted"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
    ]);

    for record in records {
        let id = record.id.map_or("N/A".to_string(), |id| id.to_string());
        table.add_row(vec![
            Cell::new(id),
            Cell::new(record.date.format("%Y-%m-%d %H:%M:%S").to_string()),
            ui::number_cell(record.amount),
            Cell::new(&record.from_currency),
            ui::number_cell(record.converted_amount),
            Cell::new(&record.to_currency),
            ui::number_cell(record.exchange_rate),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Conversion History", ui::StyleType::Title),
        table
    )
}

pub async fn run(history: &HistoryStore) -> Result<()> {
    let records = history.list_all().await?;
    println!("{}", display_as_table(&records));
    Ok(())
}
