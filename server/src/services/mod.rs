pub mod bracket;
pub mod controller;
pub mod fetcher;
pub mod llm;
pub mod prompts;
pub mod runs;
