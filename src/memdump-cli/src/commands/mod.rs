//! Command handlers for memdump CLI

pub mod configure;
pub mod dump;
pub mod list;
pub mod strings;
