//! # DIFAL
//!
//! Interstate rate differential owed to the destination state on sales to
//! final consumers.
//!
//! ```text
//! base        = gross + IPI (fixed asset only) ± discount
//! fcp         = base × fcp% / 100
//! difal       = base × (internal% − interstate%) / 100
//! destination = difal, origin = 0
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::TaxableItem;
use crate::money::percent_of;

/// DIFAL amounts and their split between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifalResult {
    pub base: Decimal,
    pub fcp: Decimal,
    pub difal: Decimal,
    /// Share owed to the destination state.
    pub destination_value: Decimal,
    /// Share owed to the origin state (always zero since 2019).
    pub origin_value: Decimal,
}

pub fn calculate(item: &TaxableItem) -> DifalResult {
    let base = item.amounts().raw_base();
    let fcp = percent_of(base, item.fcp_rate);
    let difal = percent_of(base, item.difal_internal_rate - item.difal_interstate_rate);
    debug!(
        table = "DIFAL Calculation",
        base = %base,
        fcp = %fcp,
        difal = %difal,
        "DIFAL computed"
    );
    DifalResult {
        base,
        fcp,
        difal,
        destination_value: difal,
        origin_value: Decimal::ZERO,
    }
}
