pub mod error;
pub mod facade;
pub mod messages;
pub mod scores;
pub mod validate;

pub use error::ApiError;
pub use facade::{Endpoint, Facade, Reply};
pub use messages::MessageQueue;
pub use scores::ScoreLedger;
