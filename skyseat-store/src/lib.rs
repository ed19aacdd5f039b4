pub mod app_config;
pub mod database;
pub mod seat_repo;
pub mod booking_repo;
pub mod catalog_repo;
pub mod memory;
pub mod redis_repo;
pub mod notifier;
#[cfg(feature = "kafka")]
pub mod events;

pub use database::DbClient;
pub use seat_repo::PgSeatRepository;
pub use booking_repo::PgBookingRepository;
pub use catalog_repo::PgCatalogRepository;
pub use memory::MemoryStore;
pub use redis_repo::RedisClient;
pub use notifier::LogNotifier;
#[cfg(feature = "kafka")]
pub use events::EventProducer;
