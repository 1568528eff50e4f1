pub mod decide;
pub mod events;
pub mod health;
