//! Purchasing domain module (purchase orders placed with vendors).
//!
//! Plain records with input validation; persistence and metric recomputation
//! live in the infrastructure layer.

pub mod order;

pub use order::{
    OrderStatus, PurchaseOrder, PurchaseOrderDraft, PurchaseOrderPatch, COMPLETED,
};
