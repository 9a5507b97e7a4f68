use thiserror::Error;

use ecom_core::CoreError;
use ecom_storage::StorageError;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("no categories configured")]
    NoCategories,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
