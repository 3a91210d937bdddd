//! Prompt templates handed to text generators

mod template;

pub use template::PromptTemplate;
