#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod course_service;
pub mod error;
pub mod project_discovery;

pub use lms_core::Clock;

pub use app_services::AppServices;
pub use config::{AppConfig, ProjectDiscoveryConfig};
pub use course_service::CourseProgressService;
pub use error::{AppServicesError, CourseServiceError};
pub use project_discovery::ProjectDiscovery;
