//! State machine behind the "add customer" dialog.

use std::sync::Arc;

use shared::domain::{Customer, CustomerField};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    directory_cache::DirectoryCache, error::CREATE_FAILED_MESSAGE, transport::DirectoryApi,
};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    MissingFields(Vec<CustomerField>),
}

/// Unsaved customer being edited in the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl DraftCustomer {
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::FirstName => &self.first_name,
            CustomerField::LastName => &self.last_name,
            CustomerField::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: CustomerField, value: String) {
        let slot = match field {
            CustomerField::FirstName => &mut self.first_name,
            CustomerField::LastName => &mut self.last_name,
            CustomerField::Email => &mut self.email,
        };
        *slot = value;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn missing_fields(&self) -> Vec<CustomerField> {
        CustomerField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// Presence check only; the endpoint owns email syntax validation.
    pub fn validate(&self) -> Result<Customer, DraftError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }
        Ok(Customer::new(
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
        ))
    }
}

impl From<&Customer> for DraftCustomer {
    fn from(value: &Customer) -> Self {
        Self {
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
            email: value.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub is_open: bool,
    pub draft: DraftCustomer,
    pub submission: SubmissionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The customer was created and the directory refetched.
    Created,
    /// The draft failed the presence check; nothing was sent.
    Invalid,
    /// The create call failed; the draft is preserved.
    Failed,
    /// Another submission is already in flight.
    Busy,
    /// The dialog is not open; nothing was sent.
    Closed,
}

/// Clears `Submitting` on every exit path of `submit`, including when the
/// submit future is dropped before the response arrives.
struct SubmittingRelease<'a> {
    state: &'a watch::Sender<FormState>,
    settled: bool,
}

impl<'a> SubmittingRelease<'a> {
    fn engage(state: &'a watch::Sender<FormState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, apply: impl FnOnce(&mut FormState)) {
        self.state.send_modify(apply);
        self.settled = true;
    }
}

impl Drop for SubmittingRelease<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.state.send_if_modified(|form| {
            if form.submission.is_submitting() {
                form.submission = SubmissionState::Idle;
                true
            } else {
                false
            }
        });
    }
}

#[derive(Clone)]
pub struct CreationFormController {
    api: Arc<dyn DirectoryApi>,
    cache: DirectoryCache,
    state: Arc<watch::Sender<FormState>>,
}

impl CreationFormController {
    pub fn new(api: Arc<dyn DirectoryApi>, cache: DirectoryCache) -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self {
            api,
            cache,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn open(&self) {
        self.state.send_if_modified(|form| {
            if form.is_open {
                false
            } else {
                form.is_open = true;
                true
            }
        });
    }

    /// Dismisses the dialog and discards the draft. Returns `false` without
    /// changing anything while a submission is in flight.
    pub fn close(&self) -> bool {
        let mut closed = false;
        self.state.send_if_modified(|form| {
            if form.submission.is_submitting() {
                debug!("ignoring close while a customer submission is in flight");
                return false;
            }
            let before = form.clone();
            form.is_open = false;
            form.draft.clear();
            form.submission = SubmissionState::Idle;
            closed = true;
            *form != before
        });
        closed
    }

    pub fn set_field(&self, field: CustomerField, value: impl Into<String>) {
        let value = value.into();
        self.state.send_if_modified(|form| {
            if form.draft.get(field) == value {
                return false;
            }
            form.draft.set(field, value);
            true
        });
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let mut payload = None;
        let mut outcome = SubmitOutcome::Busy;
        self.state.send_if_modified(|form| {
            if form.submission.is_submitting() {
                return false;
            }
            if !form.is_open {
                debug!("ignoring submit while the customer dialog is closed");
                outcome = SubmitOutcome::Closed;
                return false;
            }
            match form.draft.validate() {
                Ok(customer) => {
                    form.submission = SubmissionState::Submitting;
                    payload = Some(customer);
                }
                Err(err) => {
                    debug!(%err, "customer draft failed validation");
                    form.submission = SubmissionState::Failed(err.to_string());
                    outcome = SubmitOutcome::Invalid;
                }
            }
            true
        });
        let Some(customer) = payload else {
            return outcome;
        };

        let release = SubmittingRelease::engage(&self.state);
        match self.api.create_customer(&customer).await {
            Ok(()) => {
                info!(email = %customer.email, "customer created");
                self.state.send_modify(|form| form.draft.clear());
                self.cache.invalidate().await;
                release.settle(|form| {
                    form.is_open = false;
                    form.submission = SubmissionState::Idle;
                });
                SubmitOutcome::Created
            }
            Err(err) => {
                warn!(%err, "failed to create customer");
                let message = err
                    .server_message()
                    .unwrap_or(CREATE_FAILED_MESSAGE)
                    .to_string();
                release.settle(|form| form.submission = SubmissionState::Failed(message));
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/creation_form_tests.rs"]
mod tests;
