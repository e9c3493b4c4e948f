//! This crate provides edustats, a dashboard backend over the Colombian education establishments
//! open dataset published on [datos.gov.co](https://www.datos.gov.co/resource/qijw-htwa.json).
//!
//! Records matching a set of user filters are fetched from the Socrata API and aggregated into
//! chart specifications: establishments by zone, by school schedule, by establishment type, and
//! by service provider and premises ownership. The distinct values offered by the filter
//! selectors are derived from the same API.
//!
//! edustats can run as an HTTP service or render a single view from the command line.
//!
//! It is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [reqwest] for talking to the open data API.
//! * [Serde](serde) performs (de)serialisation of JSON request, response and upstream data.

pub mod app;
pub mod app_state;
pub mod chart;
pub mod cli;
pub mod controller;
pub mod distinct;
pub mod error;
pub mod metrics;
pub mod models;
pub mod query;
pub mod server;
pub mod source;
pub mod tally;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_json;
pub mod view;
pub mod views;
