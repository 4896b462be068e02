// SPDX-License-Identifier: Apache-2.0

/// Slug for a company name, used as the canonical URL path segment for a
/// profile page. Total and deterministic over every input string; not
/// injective (distinct names may collapse to the same slug).
#[must_use]
pub fn normalize_company_name(name: &str) -> String {
    slugify(name)
}

/// Slug for a municipality name; same construction as company slugs so the
/// two kinds of path segment behave identically.
#[must_use]
pub fn normalize_municipality_name(name: &str) -> String {
    slugify(name)
}

// Lowercase, fold æ/ø/å, whitespace and hyphen runs become one hyphen,
// everything else outside [a-z0-9] is dropped. Emitting separators lazily
// (only in front of a kept character) trims and collapses in one pass.
fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            pending_separator = true;
            continue;
        }
        let replacement: &str = match c {
            'æ' => "ae",
            'ø' => "o",
            'å' => "a",
            c if c.is_ascii_alphanumeric() => {
                if pending_separator && !out.is_empty() {
                    out.push('-');
                }
                pending_separator = false;
                out.push(c);
                continue;
            }
            _ => continue,
        };
        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;
        out.push_str(replacement);
    }
    out
}
