//! Manobal: backend for a student mental-health chatbot.

pub mod api;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod mail;
pub mod safety;
pub mod scrape;
pub mod store;
pub mod wellbeing;
