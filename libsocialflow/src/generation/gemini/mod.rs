//! Gemini REST API client

mod client;
mod dto;

pub use client::GeminiClient;
