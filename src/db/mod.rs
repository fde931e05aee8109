pub mod documents;
pub mod memory;
pub mod outfits;
pub mod plans;
pub mod postgres;
pub mod redis;
pub mod users;

pub use documents::DocumentStore;
pub use memory::MemoryDocumentStore;
pub use outfits::OutfitRepository;
pub use plans::PlanStore;
pub use postgres::{create_pool, PgDocumentStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use users::UserRepository;
