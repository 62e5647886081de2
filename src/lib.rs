pub mod roster;
pub mod assign;
pub mod schedule;
pub mod standings;
pub mod service;
pub mod config;
pub mod error;
pub mod display;
pub mod web;
