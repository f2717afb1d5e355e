//! Turning label facts (typed in or photographed) into a Safe/Risky verdict
//! with tips, tolerating whatever the model sends back.

pub mod defaults;
pub mod extract;
pub mod fallback;
pub mod image;
pub mod parser;
pub mod prediction;
pub mod prompt;
pub mod services;
pub mod tips;
