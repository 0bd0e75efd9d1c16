//! Filter evaluation against JSON documents.
//!
//! These are the reference semantics for [`Filter`]; SQL backends translate the
//! same rules into their own dialect.

use medtour_storage::Filter;
use serde_json::Value;

/// Returns `true` if `document` satisfies `filter`.
pub fn matches(filter: &Filter, document: &Value) -> bool {
    match filter {
        Filter::Contains { fields, needle } => {
            let needle = needle.to_lowercase();
            fields
                .iter()
                .any(|field| field_contains(document.get(field), &needle))
        }
        Filter::Equals { field, value } => {
            document.get(field).and_then(Value::as_str) == Some(value.as_str())
        }
        Filter::Between { field, from, to } => match document.get(field).and_then(Value::as_str) {
            Some(v) => v >= from.as_str() && v <= to.as_str(),
            None => false,
        },
        Filter::All(filters) => filters.iter().all(|f| matches(f, document)),
    }
}

/// `needle` must already be lowercased.
fn field_contains(value: Option<&Value>, needle: &str) -> bool {
    match value {
        Some(Value::String(s)) => s.to_lowercase().contains(needle),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hospital() -> Value {
        json!({
            "name": "Apollo Hospitals",
            "country": "India",
            "specialties": ["Cardiology", "Oncology"],
            "activePatients": 45
        })
    }

    #[test]
    fn contains_is_case_insensitive_and_unanchored() {
        let doc = hospital();
        assert!(matches(&Filter::contains(["name"], "POLLO"), &doc));
        assert!(matches(&Filter::contains(["name"], "hospitals"), &doc));
        assert!(!matches(&Filter::contains(["name"], "fortis"), &doc));
    }

    #[test]
    fn contains_matches_any_array_element() {
        let doc = hospital();
        assert!(matches(&Filter::contains(["specialties"], "onco"), &doc));
        assert!(!matches(&Filter::contains(["specialties"], "neuro"), &doc));
    }

    #[test]
    fn contains_ignores_missing_and_non_string_fields() {
        let doc = hospital();
        assert!(!matches(&Filter::contains(["location"], "a"), &doc));
        assert!(!matches(&Filter::contains(["activePatients"], "45"), &doc));
    }

    #[test]
    fn equals_requires_exact_string() {
        let doc = json!({ "status": "Paid" });
        assert!(matches(&Filter::equals("status", "Paid"), &doc));
        assert!(!matches(&Filter::equals("status", "paid"), &doc));
    }

    #[test]
    fn between_is_inclusive() {
        let doc = json!({ "issuedDate": "2026-10-31" });
        assert!(matches(
            &Filter::between("issuedDate", "2026-10-01", "2026-10-31"),
            &doc
        ));
        assert!(!matches(
            &Filter::between("issuedDate", "2026-11-01", "2026-11-30"),
            &doc
        ));
    }

    #[test]
    fn all_requires_every_filter() {
        let doc = json!({ "status": "Paid", "issuedDate": "2026-10-05" });
        let filter = Filter::equals("status", "Paid")
            .and(Filter::between("issuedDate", "2026-10-01", "2026-10-31"));
        assert!(matches(&filter, &doc));

        let unpaid = json!({ "status": "Unpaid", "issuedDate": "2026-10-05" });
        assert!(!matches(&filter, &unpaid));
    }
}
