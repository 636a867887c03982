pub mod interaction;
pub mod partner;
pub mod user;

pub use interaction::{InteractionRecord, MatchStatus, NewInteraction};
pub use partner::{PartnerView, Requester};
pub use user::User;
