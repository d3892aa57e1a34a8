//! Data source selection - which backing store each repository family uses.

mod data_source;
mod repository_factory;

pub use data_source::{DataSource, DEFAULT_DATA_SOURCE, GOALS_SOURCE_VAR, USERS_SOURCE_VAR};
pub use repository_factory::{
    create_repository, create_repository_with, RepositoryConstructor, RepositoryRegistry,
};
