pub mod bootstrap;
pub mod commands;
pub mod event_form;
