//! Bar series access port trait.

use crate::domain::bar::PriceBar;
use crate::domain::error::SigtraderError;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `instrument` in ascending date order, restricted to the
    /// inclusive window when bounds are given.
    fn fetch_bars(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SigtraderError>;
}
