//! Login entry points: provider redirect, backend credentials and the OAuth
//! callback exchange. Each attempt uses exactly one of them.

pub mod flow;
pub mod validation;

pub use flow::{authorization_request, login_with_redirect, LoginFlow};
pub use validation::{validate_credentials, FieldErrors};
