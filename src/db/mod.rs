//! Database layer: pool, migrations and the Postgres user store.

mod pool;
mod users;

pub use pool::{create_pool, run_migrations, DbPool};
pub use users::PgUserStore;
