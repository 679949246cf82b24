//! Collection managers and use-case views.
//!
//! # Responsibility
//! - Own the in-memory collections and orchestrate validation, persistence
//!   and change notification.
//! - Keep front ends decoupled from storage details.

pub mod bookmark_service;
pub mod dashboard;
pub mod entity_manager;
pub mod event_service;
pub mod note_service;
pub mod task_service;
