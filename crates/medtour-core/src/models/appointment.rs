use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub hospital_id: String,
    pub hospital_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub appointment_date: OffsetDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

impl Record for Appointment {
    const ENTITY: &'static str = "Appointment";
    const COLLECTION: CollectionSpec = CollectionSpec::new("appointments", &[]);

    record_id!();

    fn validate(&self) -> Result<()> {
        Validator::new()
            .required("patientId", &self.patient_id)
            .required("patientName", &self.patient_name)
            .required("doctorId", &self.doctor_id)
            .required("doctorName", &self.doctor_name)
            .required("hospitalId", &self.hospital_id)
            .required("hospitalName", &self.hospital_name)
            .min_len("reason", &self.reason, 10)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_date_is_rfc3339() {
        let appointment: Appointment = serde_json::from_value(json!({
            "patientId": "p-1",
            "patientName": "John Doe",
            "doctorId": "d-1",
            "doctorName": "Dr. Rajesh Kumar",
            "hospitalId": "h-1",
            "hospitalName": "Apollo Hospitals",
            "appointmentDate": "2026-10-19T09:30:00Z",
            "reason": "Follow-up consultation for cardiology.",
            "status": "Scheduled"
        }))
        .unwrap();
        assert!(appointment.validate().is_ok());
        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["appointmentDate"], "2026-10-19T09:30:00Z");
    }
}
