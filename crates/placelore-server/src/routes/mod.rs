pub mod content;
pub mod generate;
pub mod health;
