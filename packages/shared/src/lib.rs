//! Cross-cutting helpers shared by the Sajiki packages.

pub mod logger;
pub mod time;
