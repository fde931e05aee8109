//! External data providers.
//!
//! Each upstream API sits behind a trait so the planner and route handlers
//! can run against stubs, and so providers can be disabled when their API
//! key is not configured.
pub mod chat;
pub mod weather;

pub use chat::{stylist_messages, ChatProvider, OpenAiChatProvider, STYLIST_PROMPT};
pub use weather::{WeatherApiProvider, WeatherProvider};
