pub mod backend;
pub mod quiz_api_client;

pub use backend::{AuthoringBackend, QuizBackend};
pub use quiz_api_client::QuizApiClient;
