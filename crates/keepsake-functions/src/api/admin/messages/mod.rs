pub mod by_id;
pub mod index;
pub mod pending;
pub mod status;
