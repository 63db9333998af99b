pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use models::message::Message;
pub use services::dedup::DedupService;
pub use services::sync::reconcile;
