pub mod health;
pub mod resolve;
pub mod sweep;
pub mod token;
