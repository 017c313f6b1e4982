pub mod best;
pub mod index;
