pub mod duration;
pub mod models;
pub mod reconciler;
pub mod time;
