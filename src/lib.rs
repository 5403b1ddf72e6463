pub mod boundaries;
pub mod cleaner;
pub mod derive;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod region;
pub mod render;
pub mod summary;
pub mod survey;
