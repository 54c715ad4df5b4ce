//! Service layer providing the panel's business operations on top of models.
//! - Aggregates raw rows into dashboard metrics and table view-models.
//! - Serves the customer panel's own-data read views.
//! - Resolves broadcast audiences and fans notifications out per client.
//! - Keeps per-client notification feeds fresh through a cancellable poller.
//! - Pure row-to-view mapping is kept separate from fetching so it can be
//!   tested without a database.

pub mod broadcast;
pub mod clients;
pub mod errors;
pub mod feed;
pub mod invoices;
pub mod metrics;
pub mod panel;
pub mod poller;
pub mod services;
