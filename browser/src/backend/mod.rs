//! Host backends: the headless run loop and simulated capture devices.

pub mod headless;
pub mod sim;
