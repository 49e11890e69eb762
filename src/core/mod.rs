pub mod llm;
pub mod model;
