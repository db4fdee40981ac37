pub mod power;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::model::{Location, RawObservationSet};

/// Remote provider of daily observations for a single point.
///
/// Uses `BoxFuture` so the trait stays object-safe (`dyn ClimateSource`).
pub trait ClimateSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the raw date → value mapping for `location`.
    ///
    /// A response with the expected shape but no entries is `Ok` with an
    /// empty set; an unexpected shape is `FetchError::Decode`.
    fn fetch_daily(
        &self,
        location: Location,
    ) -> BoxFuture<'_, Result<RawObservationSet, Report<FetchError>>>;
}
