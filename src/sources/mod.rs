//! Market data providers.
//!
//! A provider turns `(symbol, interval, start, end)` into a [`RawTable`]. It
//! owns any symbol aliasing and reports an empty answer as
//! [`AppError::NoData`](crate::error::AppError::NoData).

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{Interval, RawTable};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetch bars in `[start, end)`.
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawTable>;
}
