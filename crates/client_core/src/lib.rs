//! Client-side synchronization for the customer directory: a revalidatable
//! cache of the customer list and the controller behind the creation dialog.

pub mod creation_form;
pub mod directory_cache;
pub mod error;
pub mod transport;
pub mod view;

pub use creation_form::{
    CreationFormController, DraftCustomer, DraftError, FormState, SubmissionState, SubmitOutcome,
};
pub use directory_cache::{CustomerCollection, DirectoryCache, FetchState};
pub use error::ClientError;
pub use transport::{DirectoryApi, HttpDirectoryApi};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
