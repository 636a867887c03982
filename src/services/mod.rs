pub mod matching;
pub mod session;

pub use matching::{EngineSettings, MatchingEngine};
pub use session::PartnerSession;
