pub mod discount;
pub mod pricing;
pub mod inventory;

pub use discount::{apply, DiscountError, DiscountValidator, ValidDiscount};
pub use pricing::{PriceSnapshot, PricingError};
pub use inventory::{InventoryError, SeatInventory};
