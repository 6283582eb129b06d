//! Request handlers, one module per resource

mod catalog;
mod rules;
mod summary;
mod transactions;
mod validation;

pub use catalog::{list_classifications, list_payment_methods};
pub use rules::list_rules;
pub use summary::{get_summary, list_audit};
pub use transactions::{classify, create_transaction, get_transaction, list_transactions};
pub use validation::validate_transaction;
