pub mod api;
pub mod auth;
pub mod calendar;
pub mod cli;
pub mod core;
pub mod google;
pub mod presentation;
pub mod web;
