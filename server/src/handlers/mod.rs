pub mod generate;
pub mod prompts;
pub mod tournament;
