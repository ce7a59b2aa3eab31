use anyhow::{Context, Result};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};

use crate::shared::config::DatabaseConfig;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .context("Failed to build database pool")
}

/// Mint an opaque capability token. The token itself is the authorization
/// for the resource it is stored against; it never maps to a user identity.
pub fn generate_access_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| {
            let idx = rng.gen_range(0..62);
            let chars = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            chars[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::generate_access_token;

    #[test]
    fn access_tokens_are_32_alphanumeric_chars() {
        let token = generate_access_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn access_tokens_are_unique_enough() {
        let a = generate_access_token();
        let b = generate_access_token();
        assert_ne!(a, b);
    }
}
