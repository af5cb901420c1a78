#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "This crate contains the generic paginated document-access layer, the task"]
#![doc = "ownership/assignment authorization policy, the resource services built on"]
#![doc = "top of them, and the authentication, routing and error-handling machinery"]
#![doc = "used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
