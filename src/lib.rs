pub mod calc;
pub mod controller;
pub mod draw;
pub mod error;
pub mod gui;
pub mod logging;
pub mod overlay;
pub mod settings;
