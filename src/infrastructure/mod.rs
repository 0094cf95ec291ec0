pub mod base_event_repository;
pub mod config;
pub mod error;
pub mod event_mapper;
pub mod google_calendar_client;
