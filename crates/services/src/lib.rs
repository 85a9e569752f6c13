#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod journal_service;
pub mod progress_service;
pub mod stats_service;
pub mod sync;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, JournalError, ProgressError, StatsError};
pub use journal_service::JournalService;
pub use progress_service::ProgressService;
pub use stats_service::{DashboardSnapshot, StatsService};
pub use sync::{ProgressChannel, Subscription};
