pub mod client;
pub mod directory;
pub mod error;
pub mod implementation;
pub mod listing;
pub mod name;
pub mod proxy;
pub mod registrar;
pub mod render;
pub mod resolver;
