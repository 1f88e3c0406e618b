pub mod checkout;
pub mod order;
pub mod status;

pub use checkout::{
    Customer, FlowSnapshot, FlowState, Outcome, PaymentMethod, Product, Settlement,
};
pub use order::{CreateOrder, PaymentOrder};
pub use status::{PaymentStatus, StatusCodes};
