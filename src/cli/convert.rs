use super::{history, ui};
use crate::core::{Conversion, ConversionRecord, RateSource, convert, rates::normalize_code};
use crate::providers::{HistoricalRate, rates_for_window};
use crate::store::HistoryStore;
use anyhow::{Context, Result, bail};
use chrono::Local;
use futures::StreamExt;
use std::io::{BufRead, Write};
use std::pin::pin;
use tracing::{error, info, warn};

/// Validated inputs of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: &str, to: &str) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            bail!("Amount must be a non-negative number, got {amount}");
        }
        let from = normalize_code(from);
        let to = normalize_code(to);
        if from.is_empty() || to.is_empty() {
            bail!("Currency codes must not be empty");
        }
        Ok(Self { amount, from, to })
    }
}

pub fn parse_amount(input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid amount: '{}'", input.trim()))
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input ended before a value was entered");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Builds a request from command line values, prompting on stdin for any that
/// are missing.
pub fn prompt_request(
    amount: Option<f64>,
    from: Option<String>,
    to: Option<String>,
) -> Result<ConversionRequest> {
    let stdin = std::io::stdin();
    prompt_request_from(&mut stdin.lock(), &mut std::io::stdout(), amount, from, to)
}

pub fn prompt_request_from(
    input: &mut impl BufRead,
    output: &mut impl Write,
    amount: Option<f64>,
    from: Option<String>,
    to: Option<String>,
) -> Result<ConversionRequest> {
    let amount = match amount {
        Some(amount) => amount,
        None => parse_amount(&prompt(input, output, "Enter the amount : ")?)?,
    };
    let from = match from {
        Some(from) => from,
        None => prompt(input, output, "Enter the currency to convert from : ")?,
    };
    let to = match to {
        Some(to) => to,
        None => prompt(input, output, "Enter the currency to convert to : ")?,
    };
    ConversionRequest::new(amount, &from, &to)
}

pub fn format_conversion(request: &ConversionRequest, conversion: &Conversion) -> String {
    format!(
        "{} {} = {} {}\nExchange Rate = 1 {} = {} {}",
        request.amount,
        request.from,
        ui::style_text(
            &conversion.converted_amount.to_string(),
            ui::StyleType::Value
        ),
        request.to,
        request.from,
        ui::style_text(&conversion.rate.to_string(), ui::StyleType::Label),
        request.to,
    )
}

pub fn format_historical(request: &ConversionRequest, days: u32, rates: &[HistoricalRate]) -> String {
    let mut output = ui::style_text(
        &format!("Historical Exchange Rates (Last {days} Days)"),
        ui::StyleType::Title,
    );
    if rates.is_empty() {
        output.push('\n');
        output.push_str(&ui::style_text(
            "No historical rates available.",
            ui::StyleType::Subtle,
        ));
    }
    for r in rates {
        output.push_str(&format!(
            "\n{} : 1 {} = {} {}",
            r.date.format("%Y-%m-%d"),
            request.from,
            r.rate,
            request.to
        ));
    }
    output
}

pub fn format_error(message: &str) -> String {
    ui::style_text(&format!("Error: {message}"), ui::StyleType::Error)
}

/// Runs one conversion cycle. Returns the stored record, or `None` when the
/// conversion failed and only an error was shown.
pub async fn run(
    rates: &dyn RateSource,
    history: &HistoryStore,
    request: &ConversionRequest,
    days: u32,
    show_history: bool,
) -> Result<Option<ConversionRecord>> {
    let table = match rates.fetch_latest().await {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "Failed to fetch latest rates");
            println!("{}", format_error(&e.to_string()));
            return Ok(None);
        }
    };

    let conversion = match convert(&table, request.amount, &request.from, &request.to) {
        Ok(conversion) => conversion,
        Err(e) => {
            error!(error = %e, "Conversion failed");
            println!("{}", format_error(&e.to_string()));
            return Ok(None);
        }
    };

    let mut record = ConversionRecord::new(request.amount, &request.from, &request.to, conversion);
    match history.append(&record).await {
        Ok(id) => {
            info!(id, "Stored conversion");
            record.id = Some(id);
        }
        Err(e) => warn!("Failed to store conversion: {:#}", e),
    }

    println!("{}", format_conversion(request, &conversion));

    let pb = ui::new_spinner("Fetching historical rates...");
    let mut window = pin!(rates_for_window(
        rates,
        &request.from,
        &request.to,
        days,
        Local::now().date_naive(),
    ));
    let mut historical = Vec::new();
    while let Some(rate) = window.next().await {
        historical.push(rate);
    }
    pb.finish_and_clear();

    println!();
    println!("{}", format_historical(request, days, &historical));

    if show_history {
        ui::print_separator();
        history::run(history).await?;
    }

    Ok(Some(record))
}
