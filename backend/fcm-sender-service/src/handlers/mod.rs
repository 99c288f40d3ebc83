/// HTTP handlers for the FCM sender API
pub mod notifications;

pub use notifications::*;
