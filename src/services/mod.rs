// Service exports
pub mod lightgbm;
pub mod model_store;

pub use lightgbm::{LgbModel, LgbTree, ParseError};
pub use model_store::{ModelStore, ModelStoreError};
