//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations and orchestrate interactions between different parts of the
//! application, such as account registration or emailed token flows.

pub mod email_service;
pub mod password_reset_service;
pub mod user_service;
pub mod verification_service;
