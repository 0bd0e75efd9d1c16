//! Record types, one per collection.

pub mod appointment;
pub mod doctor;
pub mod hospital;
pub mod invoice;
pub mod patient;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use doctor::Doctor;
pub use hospital::Hospital;
pub use invoice::{Invoice, InvoiceStatus};
pub use patient::{Patient, PatientStatus};
pub use user::{NewUser, User, UserRole};
