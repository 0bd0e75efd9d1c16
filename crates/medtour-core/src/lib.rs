//! # medtour-core
//!
//! Domain layer of the MedTour server: record types and their validation,
//! generic CRUD repositories, cross-entity search, dashboard KPIs and user
//! password handling. Storage is reached only through
//! [`medtour_storage::DocumentStorage`].

pub mod error;
pub mod id;
pub mod kpi;
pub mod models;
pub mod record;
pub mod repository;
pub mod search;
pub mod time;
pub mod users;
pub mod validation;

pub use error::{CoreError, Result};
pub use id::generate_id;
pub use kpi::{CountryCount, Kpi, MonthlyRevenue};
pub use record::Record;
pub use repository::Repository;
pub use search::{SearchResults, search_all};
pub use users::UserService;
