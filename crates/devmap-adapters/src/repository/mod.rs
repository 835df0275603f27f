//! Definition and mapping repositories.

mod json_mapping;
mod memory;
mod toml_project;

pub use json_mapping::JsonMappingRepository;
pub use memory::{InMemoryDefinitionRepository, InMemoryMappingRepository};
pub use toml_project::TomlProjectRepository;
