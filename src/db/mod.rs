pub mod interactions;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod users;

pub use interactions::{InteractionStore, PgInteractionStore};
pub use postgres::{create_pool, run_migrations};
pub use redis::{create_redis_client, Cache, CacheKey, SessionCache};
pub use users::{seed_users, PgUserDirectory, UserDirectory};

#[cfg(test)]
pub use interactions::MockInteractionStore;
#[cfg(test)]
pub use redis::cache::MockSessionCache;
#[cfg(test)]
pub use users::MockUserDirectory;
