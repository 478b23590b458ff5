// Service exports
pub mod directory;
pub mod memory;
pub mod postgres;
pub mod redis_cache;
pub mod relations;

pub use directory::{DirectoryError, ProfileDirectory, SubscriptionRegistry};
pub use memory::{MemoryDirectory, MemoryRelationCache};
pub use postgres::PostgresDirectory;
pub use redis_cache::RedisRelationCache;
pub use relations::{CacheError, ConditionalAppendError, QuotaAppend, RelationCache, RelationKey, HISTORY_RETENTION};
