pub mod frame;
pub mod game;
pub mod pin;
pub mod throw;
