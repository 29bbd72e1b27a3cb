pub mod fetcher;
pub mod pipeline;
pub mod sanitizer;
pub mod tagger;
