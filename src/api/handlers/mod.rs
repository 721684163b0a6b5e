//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Developer review and admin account handlers.
pub mod admin;
/// Registration, login and profile handlers.
pub mod auth;
/// Health and service info handlers.
pub mod health;
