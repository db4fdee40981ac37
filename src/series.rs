use chrono::NaiveDate;
use tracing::debug;

use crate::model::{Observation, RawObservationSet, Series};

/// Parse an upstream date key in the fixed `YYYYMMDD` format.
///
/// Only exactly eight ASCII digits forming a valid calendar date are
/// accepted, so no two distinct keys can map to the same day.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y%m%d").ok()
}

/// Turn a raw date → value mapping into an ascending [`Series`].
///
/// Keys that are not valid dates are dropped and counted. Keys are visited in
/// lexicographic order; if two of them ever resolve to the same day, the one
/// visited last wins. An empty result is "no data", not an error.
pub fn normalize(raw: &RawObservationSet) -> Series {
    let mut skipped = 0usize;
    let series: Series = raw
        .iter()
        .filter_map(|(key, &value)| match parse_date_key(key) {
            Some(date) => Some(Observation { date, value }),
            None => {
                skipped += 1;
                debug!(key = %key, "skipping observation with unparseable date key");
                None
            }
        })
        .collect();

    debug!(
        received = raw.len(),
        kept = series.len(),
        skipped,
        "normalized raw observations"
    );
    series
}
