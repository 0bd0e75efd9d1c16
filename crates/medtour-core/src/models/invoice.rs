use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    #[serde(with = "crate::time::iso_date")]
    pub due_date: Date,
    #[serde(with = "crate::time::iso_date")]
    pub issued_date: Date,
}

impl Record for Invoice {
    const ENTITY: &'static str = "Invoice";
    const COLLECTION: CollectionSpec = CollectionSpec::new("invoices", &[]);

    record_id!();

    fn validate(&self) -> Result<()> {
        Validator::new()
            .required("patientName", &self.patient_name)
            .required("patientId", &self.patient_id)
            .positive("amount", self.amount)
            .finish()
    }
}
