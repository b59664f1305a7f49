pub mod participants;
pub mod picks;
pub mod seasons;
