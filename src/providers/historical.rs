use crate::core::{RateSource, cross_rate};
use chrono::{Days, NaiveDate};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalRate {
    pub date: NaiveDate,
    /// Units of the target currency per one unit of the source currency.
    pub rate: f64,
}

/// Lazily yields the `from`/`to` rate for each of the `days` days before
/// `today`, most recent first.
///
/// One table is fetched per polled day. A day whose fetch fails, or whose table
/// lacks either currency, is skipped. The window ends early at the earliest
/// representable date.
pub fn rates_for_window<'a, S>(
    source: &'a S,
    from: &'a str,
    to: &'a str,
    days: u32,
    today: NaiveDate,
) -> impl Stream<Item = HistoricalRate> + 'a
where
    S: RateSource + ?Sized,
{
    let dates =
        (1..=days).map_while(move |offset| today.checked_sub_days(Days::new(offset.into())));
    stream::iter(dates).filter_map(move |date| async move {
        match source.fetch_historical(date).await {
            Ok(table) => match cross_rate(&table, from, to) {
                Ok(rate) => Some(HistoricalRate { date, rate }),
                Err(e) => {
                    debug!("Skipping {}: {}", date, e);
                    None
                }
            },
            Err(e) => {
                warn!("Skipping {}: {}", date, e);
                None
            }
        }
    })
}
