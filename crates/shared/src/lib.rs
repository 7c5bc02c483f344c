mod command;
mod identity;

pub use command::*;
pub use identity::*;

use time::OffsetDateTime;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}

pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Current time as unix seconds, the representation every table stores.
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
