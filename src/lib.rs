//! gemini-relay: a single-endpoint HTTP service that translates chat-style
//! requests into Google Gemini `generateContent` calls and relays the text
//! back inside a uniform `{status, response}` envelope.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;
