pub mod participant;
pub mod pick;
pub mod season;
