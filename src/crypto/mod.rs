pub mod address;
pub mod keys;
pub mod signatures;

pub use address::Address;
pub use keys::CallerKeypair;
pub use signatures::SignatureManager;
