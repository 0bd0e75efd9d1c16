use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::{Validator, is_time_slot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub specialty: String,
    /// Hospital name, not kept in sync with the hospital record.
    pub hospital: String,
    pub email: String,
    pub phone: String,
    /// Years of practice, fractional years allowed.
    pub experience: f64,
    /// Average rating, 0 to 5.
    pub rating: f64,
    /// `HH:mm-HH:mm` windows.
    pub available_slots: Vec<String>,
    #[serde(default)]
    pub active_patients: u32,
    #[serde(default)]
    pub total_patients: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Record for Doctor {
    const ENTITY: &'static str = "Doctor";
    const COLLECTION: CollectionSpec = CollectionSpec::new("doctors", &["email"]);
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "specialty", "hospital", "email"];

    record_id!();

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.min_len("name", &self.name, 2)
            .min_len("specialty", &self.specialty, 2)
            .required("hospital", &self.hospital)
            .email("email", &self.email)
            .required("phone", &self.phone)
            .non_negative("experience", self.experience)
            .range("rating", self.rating, 0.0, 5.0)
            .non_empty_list("availableSlots", &self.available_slots);
        for slot in &self.available_slots {
            v.check(
                is_time_slot(slot),
                format!("availableSlots entry '{slot}' must be HH:mm-HH:mm, start before end"),
            );
        }
        v.finish()
    }
}
