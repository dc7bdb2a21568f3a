pub mod generation;
pub mod prompt;
pub mod tournament;
