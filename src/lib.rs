//! Issues Spedy service invoices (NFS-e) for approved payment transactions.
//!
//! [`submitter::InvoiceSubmitter`] looks a transaction up by any of its
//! payment-provider ids, maps it to an [`payload::InvoicePayload`] and POSTs it
//! to the invoicing API.

pub mod config;
pub mod data;
pub mod db;
pub mod logging;
pub mod payload;
pub mod spedy;
pub mod submitter;
