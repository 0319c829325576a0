//! # geowl-cli
//!
//! Command-line front end for the geowl whitelist gate.
//!
//! ## Commands
//!
//! - **serve**: HTTP endpoint for reverse-proxy subrequests; the client
//!   address comes from `X-Forwarded-For`, the answer is `200 OK` or
//!   `403 FORBIDDEN`
//! - **check**: decide for addresses given on the command line and print
//!   why

pub mod cli;
pub mod logging;
pub mod server;

pub use cli::run;
