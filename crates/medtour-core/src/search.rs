//! Substring search across patients, doctors and hospitals.

use medtour_storage::{DynStorage, Filter};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{Doctor, Hospital, Patient};
use crate::record::Record;
use crate::repository::Repository;

/// Builds the search filter for `T`, or `None` when the trimmed query is blank.
///
/// Matching is case-insensitive and unanchored over `T::SEARCH_FIELDS`.
pub fn filter_for<T: Record>(query: &str) -> Option<Filter> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(Filter::contains(T::SEARCH_FIELDS.iter().copied(), query))
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub hospitals: Vec<Hospital>,
    pub total: usize,
}

/// Searches the three searchable collections concurrently.
pub async fn search_all(storage: &DynStorage, query: &str) -> Result<SearchResults> {
    let patients = Repository::<Patient>::new(storage.clone());
    let doctors = Repository::<Doctor>::new(storage.clone());
    let hospitals = Repository::<Hospital>::new(storage.clone());
    let query = query.trim();

    let (patients, doctors, hospitals) = tokio::try_join!(
        patients.list(Some(query)),
        doctors.list(Some(query)),
        hospitals.list(Some(query)),
    )?;

    let total = patients.len() + doctors.len() + hospitals.len();
    debug!(query, total, "search completed");
    Ok(SearchResults {
        patients,
        doctors,
        hospitals,
        total,
    })
}
