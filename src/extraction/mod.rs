// src/extraction/mod.rs
//! Resume processing: document parsing plus LLM field extraction.

pub mod extractor;
pub mod parser;

pub use extractor::FieldExtractor;
pub use parser::document_text;
