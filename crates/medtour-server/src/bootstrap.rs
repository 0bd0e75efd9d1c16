//! Demo data for a fresh store.
//!
//! Seeding runs only when the hospitals collection is empty, so restarting a
//! seeded server does not duplicate anything. Doctors and patients reference
//! hospitals and doctors by name; invoices and appointments reference the
//! generated patient, doctor and hospital ids.

use medtour_core::models::{Appointment, Doctor, Hospital, Invoice, Patient};
use medtour_core::time::{format_date, today_utc};
use medtour_core::{CoreError, Repository, Result, UserService};
use medtour_storage::DynStorage;
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};

/// Password given to every demo account.
pub const DEMO_PASSWORD: &str = "medtour-demo";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub hospitals: usize,
    pub doctors: usize,
    pub patients: usize,
    pub invoices: usize,
    pub appointments: usize,
    pub users: usize,
}

struct PatientSeed {
    name: &'static str,
    email: &'static str,
    country: &'static str,
    status: &'static str,
    hospital: usize,
    doctor: usize,
    treatment_offset_days: i64,
    code: &'static str,
}

const PATIENTS: &[PatientSeed] = &[
    PatientSeed {
        name: "John Doe",
        email: "john.doe@example.com",
        country: "USA",
        status: "In Treatment",
        hospital: 0,
        doctor: 0,
        treatment_offset_days: -5,
        code: "MT001",
    },
    PatientSeed {
        name: "Jane Smith",
        email: "jane.smith@example.com",
        country: "Canada",
        status: "Pending",
        hospital: 1,
        doctor: 1,
        treatment_offset_days: 12,
        code: "MT002",
    },
    PatientSeed {
        name: "Ahmed Al-Farsi",
        email: "ahmed.farsi@example.com",
        country: "UAE",
        status: "Discharged",
        hospital: 2,
        doctor: 2,
        treatment_offset_days: -40,
        code: "MT003",
    },
    PatientSeed {
        name: "Fatima Zohra",
        email: "fatima.zohra@example.com",
        country: "Morocco",
        status: "In Treatment",
        hospital: 0,
        doctor: 0,
        treatment_offset_days: -2,
        code: "MT004",
    },
    PatientSeed {
        name: "Chen Wei",
        email: "chen.wei@example.com",
        country: "China",
        status: "Cancelled",
        hospital: 1,
        doctor: 1,
        treatment_offset_days: 20,
        code: "MT005",
    },
    PatientSeed {
        name: "Olga Petrova",
        email: "olga.petrova@example.com",
        country: "Russia",
        status: "Pending",
        hospital: 3,
        doctor: 3,
        treatment_offset_days: 8,
        code: "MT006",
    },
];

/// (patient index, amount, status, issued offset in days)
const INVOICES: &[(usize, f64, &str, i64)] = &[
    (0, 15000.0, "Paid", -20),
    (2, 8500.0, "Paid", -60),
    (3, 22000.0, "Unpaid", -4),
    (1, 12500.0, "Unpaid", -1),
    (0, 500.0, "Overdue", -30),
];

/// (patient index, days from now, reason)
const APPOINTMENTS: &[(usize, i64, &str)] = &[
    (0, 0, "Follow-up consultation for cardiology."),
    (3, 2, "Pre-surgery checkup."),
];

fn hospital_seeds() -> Vec<Value> {
    vec![
        json!({
            "name": "Apollo Hospitals",
            "country": "India",
            "location": "Greams Lane, Off Greams Road, Chennai, Tamil Nadu 600006",
            "contact": "info@apollochennai.com",
            "phone": "+91-44-2829-3333",
            "contactPerson": "Dr. Prathap C. Reddy",
            "specialties": ["Cardiology", "Oncology", "Neurology", "Pediatrics"],
            "activePatients": 45,
            "totalPatients": 234
        }),
        json!({
            "name": "Fortis Healthcare",
            "country": "India",
            "location": "Sector 62, Phase - VIII, Mohali, Punjab 160062",
            "contact": "info@fortishealthcare.com",
            "phone": "+91-172-496-7000",
            "contactPerson": "Dr. Ashok Seth",
            "specialties": ["Cardiac Surgery", "Gastroenterology", "Urology", "Orthopedics"],
            "activePatients": 32,
            "totalPatients": 187
        }),
        json!({
            "name": "Max Healthcare",
            "country": "India",
            "location": "Press Enclave Road, Saket, New Delhi, Delhi 110017",
            "contact": "info@maxhealthcare.com",
            "phone": "+91-11-2651-5050",
            "contactPerson": "Dr. Sandeep Budhiraja",
            "specialties": ["Plastic Surgery", "IVF", "Radiology", "Dermatology"],
            "activePatients": 28,
            "totalPatients": 156
        }),
        json!({
            "name": "Manipal Hospitals",
            "country": "India",
            "location": "98, HAL Old Airport Rd, Kodihalli, Bengaluru, Karnataka 560017",
            "contact": "info@manipalhospitals.com",
            "phone": "+91-80-2502-5500",
            "contactPerson": "Dr. Sudarshan Ballal",
            "specialties": ["Nephrology", "Urology", "Robotic Surgery"],
            "activePatients": 52,
            "totalPatients": 210
        }),
    ]
}

struct DoctorSeed {
    name: &'static str,
    specialty: &'static str,
    email: &'static str,
    phone: &'static str,
    experience: f64,
    rating: f64,
    slots: &'static [&'static str],
}

/// One doctor per hospital, in the same order.
const DOCTORS: &[DoctorSeed] = &[
    DoctorSeed {
        name: "Dr. Rajesh Kumar",
        specialty: "Cardiothoracic Surgery",
        email: "rajesh.kumar@apollo.com",
        phone: "+91-98765-43210",
        experience: 15.0,
        rating: 4.8,
        slots: &["09:00-12:00", "14:00-17:00"],
    },
    DoctorSeed {
        name: "Dr. Priya Sharma",
        specialty: "Orthopedic Surgery",
        email: "priya.sharma@fortis.com",
        phone: "+91-98765-43211",
        experience: 12.0,
        rating: 4.9,
        slots: &["10:00-13:00", "15:00-18:00"],
    },
    DoctorSeed {
        name: "Dr. Anil Gupta",
        specialty: "Plastic & Cosmetic Surgery",
        email: "anil.gupta@max.com",
        phone: "+91-98765-43212",
        experience: 18.0,
        rating: 4.7,
        slots: &["08:00-11:00", "16:00-19:00"],
    },
    DoctorSeed {
        name: "Dr. Sunita Patel",
        specialty: "Nephrology",
        email: "sunita.patel@manipal.com",
        phone: "+91-98765-43213",
        experience: 10.5,
        rating: 4.8,
        slots: &["09:30-12:30"],
    },
];

fn doctor_seeds(hospitals: &[Hospital]) -> Vec<Value> {
    DOCTORS
        .iter()
        .zip(hospitals)
        .map(|(seed, hospital)| {
            json!({
                "name": seed.name,
                "specialty": seed.specialty,
                "hospital": hospital.name,
                "email": seed.email,
                "phone": seed.phone,
                "experience": seed.experience,
                "rating": seed.rating,
                "availableSlots": seed.slots
            })
        })
        .collect()
}

fn shift(date: Date, days: i64) -> Date {
    date.checked_add(Duration::days(days)).unwrap_or(date)
}

/// Seeds the store unless it already holds hospitals. Returns `None` when skipped.
pub async fn seed_demo_data(storage: &DynStorage) -> Result<Option<SeedSummary>> {
    let hospital_repo = Repository::<Hospital>::new(storage.clone());
    if hospital_repo.count(None).await? > 0 {
        tracing::debug!("store already has hospitals; skipping demo data");
        return Ok(None);
    }

    let today = today_utc();
    let now = OffsetDateTime::now_utc();
    let mut summary = SeedSummary::default();

    let mut hospitals = Vec::new();
    for body in hospital_seeds() {
        hospitals.push(hospital_repo.create_from_value(body).await?);
    }
    summary.hospitals = hospitals.len();

    let doctor_repo = Repository::<Doctor>::new(storage.clone());
    let mut doctors = Vec::new();
    for body in doctor_seeds(&hospitals) {
        doctors.push(doctor_repo.create_from_value(body).await?);
    }
    summary.doctors = doctors.len();

    let patient_repo = Repository::<Patient>::new(storage.clone());
    let mut patients = Vec::new();
    for seed in PATIENTS {
        let body = json!({
            "name": seed.name,
            "email": seed.email,
            "country": seed.country,
            "status": seed.status,
            "assignedHospital": hospitals[seed.hospital].name,
            "assignedDoctor": doctors[seed.doctor].name,
            "treatmentDate": format_date(shift(today, seed.treatment_offset_days))?,
            "patientId": seed.code
        });
        patients.push(patient_repo.create_from_value(body).await?);
    }
    summary.patients = patients.len();

    let invoice_repo = Repository::<Invoice>::new(storage.clone());
    for &(patient, amount, status, issued_offset) in INVOICES {
        let issued = shift(today, issued_offset);
        let body = json!({
            "patientName": patients[patient].name,
            "patientId": patients[patient].id,
            "amount": amount,
            "status": status,
            "issuedDate": format_date(issued)?,
            "dueDate": format_date(shift(issued, 15))?
        });
        invoice_repo.create_from_value(body).await?;
        summary.invoices += 1;
    }

    let appointment_repo = Repository::<Appointment>::new(storage.clone());
    for &(patient, days, reason) in APPOINTMENTS {
        let patient = &patients[patient];
        let doctor = doctors
            .iter()
            .find(|d| d.name == patient.assigned_doctor)
            .unwrap_or(&doctors[0]);
        let hospital = hospitals
            .iter()
            .find(|h| h.name == patient.assigned_hospital)
            .unwrap_or(&hospitals[0]);
        let when = now
            .checked_add(Duration::days(days))
            .unwrap_or(now)
            .format(&Rfc3339)
            .map_err(|e| CoreError::internal(format!("cannot format date: {e}")))?;
        let body = json!({
            "patientId": patient.id,
            "patientName": patient.name,
            "doctorId": doctor.id,
            "doctorName": doctor.name,
            "hospitalId": hospital.id,
            "hospitalName": hospital.name,
            "appointmentDate": when,
            "reason": reason,
            "status": "Scheduled"
        });
        appointment_repo.create_from_value(body).await?;
        summary.appointments += 1;
    }

    let users = UserService::new(storage.clone());
    let accounts = [
        ("MedTour Admin", "admin@medtour.example", "Super Admin"),
        ("Front Desk", "staff@medtour.example", "Staff"),
    ];
    for (name, email, role) in accounts {
        users
            .create_from_value(json!({
                "name": name,
                "email": email,
                "role": role,
                "password": DEMO_PASSWORD
            }))
            .await?;
        summary.users += 1;
    }

    tracing::info!(
        hospitals = summary.hospitals,
        doctors = summary.doctors,
        patients = summary.patients,
        invoices = summary.invoices,
        appointments = summary.appointments,
        users = summary.users,
        "demo data seeded"
    );
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtour_db_memory::create_storage;

    #[tokio::test]
    async fn seeds_once() {
        let storage = create_storage();
        let summary = seed_demo_data(&storage).await.unwrap().unwrap();
        assert_eq!(summary.hospitals, 4);
        assert_eq!(summary.doctors, 4);
        assert_eq!(summary.patients, 6);
        assert_eq!(summary.invoices, 5);
        assert_eq!(summary.appointments, 2);
        assert_eq!(summary.users, 2);

        assert!(seed_demo_data(&storage).await.unwrap().is_none());
        let hospitals = Repository::<Hospital>::new(storage.clone())
            .list(None)
            .await
            .unwrap();
        assert_eq!(hospitals.len(), 4);
    }

    #[tokio::test]
    async fn references_point_at_seeded_records() {
        let storage = create_storage();
        seed_demo_data(&storage).await.unwrap();

        let patients = Repository::<Patient>::new(storage.clone())
            .list(None)
            .await
            .unwrap();
        let invoices = Repository::<Invoice>::new(storage.clone())
            .list(None)
            .await
            .unwrap();
        for invoice in &invoices {
            assert!(patients.iter().any(|p| p.id == invoice.patient_id));
        }

        let doctors = Repository::<Doctor>::new(storage.clone())
            .list(None)
            .await
            .unwrap();
        let hospitals = Repository::<Hospital>::new(storage.clone())
            .list(None)
            .await
            .unwrap();
        for doctor in &doctors {
            assert!(hospitals.iter().any(|h| h.name == doctor.hospital));
        }
    }
}
