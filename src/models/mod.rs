mod health;
mod message;

pub use health::HealthCheck;
pub use message::{CreateMessage, Message, NewMessage};
