//! CLI subcommands.

pub mod import;
pub mod migrate;

/// Get database URL with fallback to generic `DATABASE_URL`.
fn database_url() -> Option<secrecy::SecretString> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(secrecy::SecretString::from)
}
