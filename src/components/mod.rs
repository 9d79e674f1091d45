pub mod identity;
pub mod world;
