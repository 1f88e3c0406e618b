pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod model;
pub mod service;

pub use client::OrderClient;
pub use config::{ClientConfig, ClientConfigBuilder, FlowConfig, FlowConfigBuilder};
pub use error::{CheckoutError, FailureReason};
pub use flow::{Checkout, FlowHandle, start_checkout};
pub use model::{
    CreateOrder, Customer, FlowSnapshot, FlowState, Outcome, PaymentMethod, PaymentOrder,
    PaymentStatus, Product, Settlement, StatusCodes,
};
pub use service::{OrderService, OrderServiceRef};
