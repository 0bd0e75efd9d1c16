//! # medtour-server
//!
//! axum application for the MedTour coordination dashboard: REST endpoints for
//! patients, doctors, hospitals, invoices, appointments and users, dashboard
//! KPIs, cross-entity search and file uploads.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod upload;

pub use config::AppConfig;
pub use server::{AppState, MedtourServer, ServerBuilder, build_app, create_storage, router};
