#![forbid(unsafe_code)]

pub mod canonical;
mod company;
mod municipality;
mod role;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "brreg-model";

pub use company::{Company, OrganizationNumber};
pub use municipality::{municipality_table, Municipality};
pub use role::RoleRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
