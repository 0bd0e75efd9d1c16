use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    Lead,
    Pending,
    Confirmed,
    #[serde(rename = "In Treatment")]
    InTreatment,
    Discharged,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub country: String,
    pub status: PatientStatus,
    /// Hospital name or id, not kept in sync with the hospital record.
    pub assigned_hospital: String,
    /// Doctor name or id, not kept in sync with the doctor record.
    pub assigned_doctor: String,
    #[serde(with = "crate::time::iso_date")]
    pub treatment_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// External patient code, e.g. "MT001".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

impl Record for Patient {
    const ENTITY: &'static str = "Patient";
    const COLLECTION: CollectionSpec = CollectionSpec::new("patients", &["email"]);
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "patientId",
        "country",
        "assignedHospital",
        "assignedDoctor",
    ];

    record_id!();

    fn validate(&self) -> Result<()> {
        Validator::new()
            .min_len("name", &self.name, 2)
            .email("email", &self.email)
            .min_len("country", &self.country, 2)
            .required("assignedHospital", &self.assigned_hospital)
            .required("assignedDoctor", &self.assigned_doctor)
            .finish()
    }
}
