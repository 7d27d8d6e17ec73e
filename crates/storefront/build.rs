//! Build script for storefront crate.
//!
//! `sqlx::migrate!` embeds the SQL files at compile time, but Cargo does not
//! know about them. Rebuild when a migration is added or edited so the binary
//! never ships a stale schema.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
