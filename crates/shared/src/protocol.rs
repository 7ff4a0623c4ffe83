use crate::domain::Customer;

pub fn customers_route() -> &'static str {
    "api/customers"
}

/// Body of a successful `GET /api/customers`.
pub type ListCustomersResponse = Vec<Customer>;

/// Body of `POST /api/customers`.
pub type CreateCustomerRequest = Customer;
