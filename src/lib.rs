// lib.rs - Library root for the typeahead autocomplete engine

pub mod cache;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod highlight;
pub mod nav;
pub mod source;
