use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::Validator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub location: String,
    pub country: String,
    /// Contact email.
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    pub specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub active_patients: u32,
    #[serde(default)]
    pub total_patients: u32,
}

impl Record for Hospital {
    const ENTITY: &'static str = "Hospital";
    const COLLECTION: CollectionSpec = CollectionSpec::new("hospitals", &["name"]);
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "location", "country", "specialties"];

    record_id!();

    fn validate(&self) -> Result<()> {
        Validator::new()
            .min_len("name", &self.name, 2)
            .min_len("location", &self.location, 2)
            .min_len("country", &self.country, 2)
            .email("contact", &self.contact)
            .non_empty_list("specialties", &self.specialties)
            .finish()
    }
}
