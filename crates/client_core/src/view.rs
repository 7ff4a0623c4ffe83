//! Render models for the directory table and the creation dialog.

use shared::domain::{Customer, CustomerField};

use crate::{
    creation_form::FormState,
    directory_cache::{CustomerCollection, FetchState},
};

pub const NO_CUSTOMERS_PLACEHOLDER: &str = "No customers found";
pub const NO_DATA_PLACEHOLDER: &str = "No data";
pub const DIALOG_TITLE: &str = "Add Customer";
pub const SUBMIT_LABEL: &str = "Create";
pub const SUBMITTING_LABEL: &str = "Creating...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Customer> for CustomerRow {
    fn from(value: &Customer) -> Self {
        Self {
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
            email: value.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Loading,
    Placeholder(&'static str),
    Rows(Vec<CustomerRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryView {
    pub error_banner: Option<String>,
    pub body: TableBody,
}

impl DirectoryView {
    pub fn render(state: &FetchState<CustomerCollection>) -> Self {
        match state {
            FetchState::Loading => Self {
                error_banner: None,
                body: TableBody::Loading,
            },
            FetchState::Error(err) => Self {
                error_banner: Some(err.message.clone()),
                body: TableBody::Placeholder(NO_DATA_PLACEHOLDER),
            },
            FetchState::Ready(customers) if customers.is_empty() => Self {
                error_banner: None,
                body: TableBody::Placeholder(NO_CUSTOMERS_PLACEHOLDER),
            },
            FetchState::Ready(customers) => Self {
                error_banner: None,
                body: TableBody::Rows(customers.iter().map(CustomerRow::from).collect()),
            },
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error_banner = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: CustomerField,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub visible: bool,
    pub title: &'static str,
    pub fields: Vec<FieldView>,
    pub error_banner: Option<String>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub cancel_enabled: bool,
}

impl FormView {
    pub fn render(state: &FormState) -> Self {
        let submitting = state.submission.is_submitting();
        Self {
            visible: state.is_open,
            title: DIALOG_TITLE,
            fields: CustomerField::ALL
                .into_iter()
                .map(|field| FieldView {
                    field,
                    label: field.label(),
                    value: state.draft.get(field).to_string(),
                    required: true,
                })
                .collect(),
            error_banner: state.submission.failure_message().map(str::to_string),
            submit_label: if submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            submit_enabled: !submitting,
            cancel_enabled: !submitting,
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
