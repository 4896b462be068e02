// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod directory;
mod location;
mod slug;

pub const CRATE_NAME: &str = "brreg-query";

pub use directory::{
    CompanyDirectory, ACCOUNTING_INDUSTRY_PREFIX, BEAUTY_INDUSTRY_PREFIX,
};
pub use location::LocationIndex;
pub use slug::{normalize_company_name, normalize_municipality_name};
