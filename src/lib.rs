#![deny(missing_docs)]
//! Currency Info bot
//!
//! A Telegram bot that answers cryptocurrency price and ranking questions
//! asked in natural language. Messages are classified by a Dialogflow agent
//! and answered with CoinMarketCap data.

/// Per-chat intent sessions
pub mod agent;
/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Intent to request mapping
pub mod dispatcher;
/// Telegram HTML rendering of market data
pub mod format;
/// Shared HTTP client and error type
pub mod http_utils;
/// Intent classification service
pub mod intent;
/// Market data service
pub mod market;
/// Alias normalization of intent parameters
pub mod normalize;
/// Message to reply pipeline
pub mod service;
/// Static alias tables
pub mod tables;
