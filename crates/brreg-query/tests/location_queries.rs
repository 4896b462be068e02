// SPDX-License-Identifier: Apache-2.0

use brreg_model::{municipality_table, Company};
use brreg_query::{
    normalize_municipality_name, CompanyDirectory, LocationIndex,
};
use serde_json::json;

fn index() -> LocationIndex {
    LocationIndex::new(municipality_table().expect("embedded table"))
}

fn company(number: &str, name: &str, postal: &str, municipality: &str, industry: &str) -> Company {
    Company::from_registry_record(json!({
        "organisasjonsnummer": number,
        "navn": name,
        "organisasjonsform": {"kode": "AS"},
        "forretningsadresse": {"postnummer": postal, "kommune": municipality},
        "naeringskode1": {"kode": industry}
    }))
    .expect("fixture company")
}

fn fixture_directory() -> CompanyDirectory {
    CompanyDirectory::from_companies(vec![
        // Exact postal match in Bergen.
        company("111111111", "Fjord Regnskap AS", "5003", "BERGEN", "69.201"),
        // Same municipality, different postal code: reached only by widening.
        company("222222222", "Bryggen Hudpleie", "5006", "Bergen", "96.020"),
        // Different municipality entirely.
        company("333333333", "Oslo Tall AS", "0150", "OSLO", "69.201"),
        // Postal code nobody's municipality claims.
        company("444444444", "Utkant Regnskap", "0000", "UKJENT", "69.201"),
    ])
}

#[test]
fn postal_round_trip_over_the_whole_reference_table() {
    let table = municipality_table().expect("embedded table");
    let index = LocationIndex::new(table.clone());
    for municipality in &table {
        for code in &municipality.postal_codes {
            assert_eq!(
                index.find_municipality_by_postal_code(code),
                Some(municipality.name.as_str()),
                "postal code {code} must resolve to {}",
                municipality.name
            );
        }
    }
}

#[test]
fn slug_round_trip_for_every_known_municipality() {
    let table = municipality_table().expect("embedded table");
    let index = LocationIndex::new(table.clone());
    for municipality in &table {
        let slug = normalize_municipality_name(&municipality.name);
        assert_eq!(
            index.denormalize_municipality_name(&slug),
            municipality.name,
            "slug {slug} must round-trip"
        );
    }
}

#[test]
fn postal_code_search_widens_to_the_containing_municipality() {
    let directory = fixture_directory();
    let index = index();

    let widened = directory.companies_by_location(&index, "5003");
    let numbers: Vec<&str> = widened
        .iter()
        .map(|c| c.organization_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["111111111", "222222222"]);

    // Every widened hit is either the literal postal code or the resolved
    // municipality, case-insensitively.
    for hit in &widened {
        let postal = hit.postal_code() == Some("5003");
        let muni = hit
            .municipality()
            .map(|m| m.eq_ignore_ascii_case("bergen"))
            .unwrap_or(false);
        assert!(postal || muni);
    }
}

#[test]
fn unknown_postal_code_falls_back_to_narrow_literal_match() {
    let directory = fixture_directory();
    let hits = directory.companies_by_location(&index(), "0000");
    let numbers: Vec<&str> = hits
        .iter()
        .map(|c| c.organization_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["444444444"]);
}

#[test]
fn municipality_name_match_is_case_insensitive() {
    let directory = fixture_directory();
    let hits = directory.companies_by_location(&index(), "bergen");
    assert_eq!(hits.len(), 2);
    let hits_upper = directory.companies_by_location(&index(), "BERGEN");
    assert_eq!(hits_upper.len(), 2);
}

#[test]
fn industry_filters_compose_with_location() {
    let directory = fixture_directory();
    let index = index();

    let accountants = directory.accounting_firms_by_location(&index, "5003");
    assert_eq!(accountants.len(), 1);
    assert_eq!(accountants[0].name, "Fjord Regnskap AS");

    let clinics = directory.beauty_clinics_by_location(&index, "5003");
    assert_eq!(clinics.len(), 1);
    assert_eq!(clinics[0].name, "Bryggen Hudpleie");
}

#[test]
fn results_never_repeat_an_organization_number() {
    // One company matching both the postal and the municipality condition.
    let directory = CompanyDirectory::from_companies(vec![company(
        "111111111",
        "Fjord Regnskap AS",
        "5003",
        "Bergen",
        "69.201",
    )]);
    let hits = directory.companies_by_location(&index(), "5003");
    assert_eq!(hits.len(), 1);
}

#[test]
fn nearby_is_bounded_and_never_includes_the_city_itself() {
    let table = municipality_table().expect("embedded table");
    let index = LocationIndex::new(table.clone());
    for municipality in &table {
        let nearby = index.nearby_municipalities(&municipality.name);
        assert!(nearby.len() <= 8, "{} has {} nearby", municipality.name, nearby.len());
        assert!(
            !nearby.contains(&municipality.name),
            "{} listed as its own neighbour",
            municipality.name
        );
    }
}

#[test]
fn nearby_for_bergen_stays_in_vestland_with_matching_postal_prefix() {
    let nearby = index().nearby_municipalities("bergen");
    assert_eq!(nearby, vec!["Stord", "Voss", "Øygarden", "Askøy"]);
}

#[test]
fn directory_loads_from_materialized_snapshot() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("companies.json");
    let snapshot = json!([
        {
            "organisasjonsnummer": "111111111",
            "navn": "Test AS",
            "forretningsadresse": {"postnummer": "0150", "kommune": "OSLO"}
        },
        {"navn": "broken record"}
    ]);
    std::fs::write(&path, snapshot.to_string()).expect("write snapshot");

    let directory = CompanyDirectory::from_snapshot(&path).expect("load snapshot");
    assert_eq!(directory.len(), 1);
    let hits = directory.companies_by_location(&index(), "Oslo");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Test AS");
}
