//! CRM Consignado API Library
//!
//! Credit simulation and proposal messaging for payroll-deductible loan
//! ("crédito consignado") leads: agents simulate operations, collect them in
//! a per-session draft, preview the proposal text and send it to the
//! customer over WhatsApp.
//!
//! # Modules
//!
//! - `simulation`: Credit simulation calculator.
//! - `proposal`: Proposal message aggregation and acceptance link.
//! - `draft`: Per-session ordered list of simulated operations.
//! - `currency`: Brazilian Real formatting and amount parsing.
//! - `pipeline`: Lead pipeline stages and stage-change messages.
//! - `messaging`: Outbound messaging trait and WhatsApp Cloud API client.
//! - `contacts`: Brazilian phone number normalization.
//! - `circuit_breaker`: Circuit breaker for the messaging provider.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and routes.
//! - `models`: Core data models and API payloads.

pub mod circuit_breaker;
pub mod config;
pub mod contacts;
pub mod currency;
pub mod draft;
pub mod errors;
pub mod handlers;
pub mod messaging;
pub mod models;
pub mod pipeline;
pub mod proposal;
pub mod simulation;
