//! Integration tests for the flagbridge Context Store and operator console

mod config_integration;
mod presenter_session;
mod provider_rest;
mod server_http;
mod test_utils;
