use serde::{Deserialize, Serialize};

use crate::discount::{apply, ValidDiscount};

/// Prices frozen into a booking at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub seat_price: i64,
    pub service_price: i64,
    /// Discount percentage, 0 when no code was used
    pub discount_value: i32,
    pub total_price: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Negative {field} price: {amount}")]
    NegativeAmount {
        field: &'static str,
        amount: i64,
    },

    #[error("Price overflow")]
    Overflow,
}

impl PriceSnapshot {
    /// `total = (seat + service) * (1 - discount / 100)`, rounded per [`apply`].
    pub fn compute(
        seat_price: i64,
        service_price: i64,
        discount: Option<&ValidDiscount>,
    ) -> Result<Self, PricingError> {
        if seat_price < 0 {
            return Err(PricingError::NegativeAmount { field: "seat", amount: seat_price });
        }
        if service_price < 0 {
            return Err(PricingError::NegativeAmount { field: "service", amount: service_price });
        }

        let base = seat_price.checked_add(service_price).ok_or(PricingError::Overflow)?;
        let discount_value = discount.map(|d| d.percentage).unwrap_or(0);

        Ok(Self {
            seat_price,
            service_price,
            discount_value,
            total_price: apply(discount_value, base),
        })
    }
}
