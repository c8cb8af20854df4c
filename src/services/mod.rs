// Service modules
pub mod chat_service;
pub mod credits_service;
pub mod image_service;
pub mod user_service;

pub use chat_service::ChatService;
pub use credits_service::{CreditsService, DebitOutcome};
pub use image_service::ImageService;
pub use user_service::UserService;
