use std::sync::Arc;
use serde::{Deserialize, Serialize};
use skyseat_core::repository::DiscountCatalog;
use skyseat_core::StoreError;

/// A discount code that passed validation, with the percentage to snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidDiscount {
    pub code: String,
    pub percentage: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("Discount code is invalid: {0}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Looks discount codes up in the discount catalog and checks they are usable.
#[derive(Clone)]
pub struct DiscountValidator {
    catalog: Arc<dyn DiscountCatalog>,
}

impl DiscountValidator {
    pub fn new(catalog: Arc<dyn DiscountCatalog>) -> Self {
        Self { catalog }
    }

    /// Unknown, inactive and out-of-range codes are all `Invalid`.
    pub async fn validate(&self, code: &str) -> Result<ValidDiscount, DiscountError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DiscountError::Invalid("empty code".to_string()));
        }

        let discount = self.catalog.find_discount(code).await?
            .ok_or_else(|| DiscountError::Invalid(code.to_string()))?;

        if !discount.is_active {
            tracing::debug!("Discount {} is inactive", code);
            return Err(DiscountError::Invalid(code.to_string()));
        }

        if !(0..=100).contains(&discount.percentage) {
            tracing::warn!("Discount {} has out-of-range percentage {}", code, discount.percentage);
            return Err(DiscountError::Invalid(code.to_string()));
        }

        Ok(ValidDiscount {
            code: discount.code,
            percentage: discount.percentage,
        })
    }
}

/// Reduce `base_amount` (minor units) by `percentage`.
///
/// Rounding is round-half-down: a remainder of exactly half a minor unit is
/// dropped, anything above it rounds up. Every total in the system goes through here.
pub fn apply(percentage: i32, base_amount: i64) -> i64 {
    let percentage = percentage.clamp(0, 100) as i128;
    let scaled = base_amount as i128 * (100 - percentage);

    let quotient = scaled.div_euclid(100);
    let remainder = scaled.rem_euclid(100);

    let rounded = if remainder > 50 { quotient + 1 } else { quotient };
    rounded as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyseat_core::{Discount, StoreResult};

    struct StaticDiscounts(Vec<Discount>);

    #[async_trait]
    impl DiscountCatalog for StaticDiscounts {
        async fn find_discount(&self, code: &str) -> StoreResult<Option<Discount>> {
            Ok(self.0.iter().find(|d| d.code == code).cloned())
        }
    }

    fn validator() -> DiscountValidator {
        DiscountValidator::new(Arc::new(StaticDiscounts(vec![
            Discount { code: "SPRING10".to_string(), percentage: 10, is_active: true },
            Discount { code: "EXPIRED".to_string(), percentage: 20, is_active: false },
            Discount { code: "BROKEN".to_string(), percentage: 140, is_active: true },
        ])))
    }

    #[test]
    fn test_apply_worked_example() {
        assert_eq!(apply(10, 1_000_000 + 200_000), 1_080_000);
        assert_eq!(apply(0, 999), 999);
        assert_eq!(apply(100, 999), 0);
    }

    #[test]
    fn test_apply_rounds_half_down() {
        // 101 * 0.5 = 50.5 -> 50
        assert_eq!(apply(50, 101), 50);
        // 102 * 0.75 = 76.5 -> 76
        assert_eq!(apply(25, 102), 76);
        // 101 * 0.7 = 70.7 -> 71
        assert_eq!(apply(30, 101), 71);
        // 333 * 0.85 = 283.05 -> 283
        assert_eq!(apply(15, 333), 283);
    }

    #[tokio::test]
    async fn test_validate_accepts_active_code() {
        let discount = validator().validate(" SPRING10 ").await.unwrap();
        assert_eq!(discount, ValidDiscount { code: "SPRING10".to_string(), percentage: 10 });
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_inactive_and_out_of_range() {
        let validator = validator();
        for code in ["NOPE", "EXPIRED", "BROKEN", "  "] {
            let result = validator.validate(code).await;
            assert!(matches!(result, Err(DiscountError::Invalid(_))), "code {code:?} should be invalid");
        }
    }
}
