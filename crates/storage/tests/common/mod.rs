pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{ObjectSpec, seeded_bytes, sha256_hash};
