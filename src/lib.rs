pub mod callbacks;
pub mod chain;
pub mod language_models;
pub mod llm;
pub mod memory;
pub mod output_parser;
pub mod schemas;
pub mod template;

pub extern crate serde_json;
