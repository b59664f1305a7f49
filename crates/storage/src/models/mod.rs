mod participant;
mod pick;
mod season;

pub use participant::Participant;
pub use pick::{Pick, PickStatus};
pub use season::Season;
