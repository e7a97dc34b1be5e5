//! Repository traits for metadata operations.

pub mod blobs;
pub mod secondary_keys;

pub use blobs::BlobRepo;
pub use secondary_keys::SecondaryKeyRepo;
