pub mod first_blood;
pub mod picks;
pub mod scoring;
