pub mod auth;
pub mod blob;
pub mod imaging;
pub mod planner;
pub mod providers;
pub mod tagging;
