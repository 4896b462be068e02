// SPDX-License-Identifier: Apache-2.0

use crate::location::LocationIndex;
use crate::slug::normalize_company_name;
use brreg_model::{Company, ValidationError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Industry-code prefix for accounting and bookkeeping firms (NACE 69.2).
pub const ACCOUNTING_INDUSTRY_PREFIX: &str = "69.2";
/// Industry-code prefix for hairdressing and beauty treatment (NACE 96.02).
pub const BEAUTY_INDUSTRY_PREFIX: &str = "96.02";

/// Read-only view over the materialized company snapshot. Built once when
/// the process starts; every query is a pure in-memory read.
#[derive(Debug, Default)]
pub struct CompanyDirectory {
    companies: Vec<Company>,
}

impl CompanyDirectory {
    #[must_use]
    pub fn from_companies(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// Loads the snapshot the ingest pipeline materialized. Individual
    /// records that no longer parse are skipped; an unreadable or
    /// non-array file is an error.
    pub fn from_snapshot(path: &Path) -> Result<Self, ValidationError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ValidationError(format!("read snapshot {} failed: {e}", path.display())))?;
        let records: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
            ValidationError(format!("snapshot {} is not a JSON array: {e}", path.display()))
        })?;
        let companies = records
            .into_iter()
            .filter_map(|record| Company::from_registry_record(record).ok())
            .collect();
        Ok(Self { companies })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Companies matching a location term, in stored order, each at most
    /// once.
    ///
    /// A term of exactly four digits is a postal code: when it resolves to
    /// a municipality the match widens to the whole municipality (postal
    /// code equal OR municipality name equal, case-insensitively); when it
    /// does not resolve, only the literal postal-code match applies. Any
    /// other term is matched as a municipality name.
    #[must_use]
    pub fn companies_by_location(&self, index: &LocationIndex, term: &str) -> Vec<&Company> {
        let term = term.trim();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut matches = Vec::new();

        if is_postal_code(term) {
            let resolved = index.find_municipality_by_postal_code(term).map(str::to_lowercase);
            for company in &self.companies {
                let postal_match = company.postal_code() == Some(term);
                let municipality_match = match (&resolved, company.municipality()) {
                    (Some(wanted), Some(actual)) => actual.to_lowercase() == *wanted,
                    _ => false,
                };
                if (postal_match || municipality_match)
                    && seen.insert(company.organization_number.as_str())
                {
                    matches.push(company);
                }
            }
            return matches;
        }

        let wanted = term.to_lowercase();
        for company in &self.companies {
            let municipality_match = company
                .municipality()
                .map(|m| m.to_lowercase() == wanted)
                .unwrap_or(false);
            if municipality_match && seen.insert(company.organization_number.as_str()) {
                matches.push(company);
            }
        }
        matches
    }

    /// Accounting firms only; composes the location query with the fixed
    /// industry filter instead of duplicating the location logic.
    #[must_use]
    pub fn accounting_firms_by_location(
        &self,
        index: &LocationIndex,
        term: &str,
    ) -> Vec<&Company> {
        self.by_location_and_industry(index, term, ACCOUNTING_INDUSTRY_PREFIX)
    }

    /// Beauty clinics only.
    #[must_use]
    pub fn beauty_clinics_by_location(&self, index: &LocationIndex, term: &str) -> Vec<&Company> {
        self.by_location_and_industry(index, term, BEAUTY_INDUSTRY_PREFIX)
    }

    fn by_location_and_industry(
        &self,
        index: &LocationIndex,
        term: &str,
        industry_prefix: &str,
    ) -> Vec<&Company> {
        self.companies_by_location(index, term)
            .into_iter()
            .filter(|company| {
                company
                    .industry_code()
                    .map(|code| code.starts_with(industry_prefix))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// First company in stored order whose name normalizes to `slug`.
    /// Slugs are not injective, so "first match wins" keeps URL resolution
    /// deterministic.
    #[must_use]
    pub fn find_company_by_slug(&self, slug: &str) -> Option<&Company> {
        self.companies
            .iter()
            .find(|company| normalize_company_name(&company.name) == slug)
    }
}

fn is_postal_code(term: &str) -> bool {
    term.len() == 4 && term.chars().all(|c| c.is_ascii_digit())
}
