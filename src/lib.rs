//! datasight - document analysis with multi-provider LLM commentary.
//!
//! Decodes tabular and text documents (CSV, Excel, PDF), keeps the most
//! recently loaded dataset in a process-wide store, and fans analysis
//! prompts out to multiple LLM providers, writing the collected answers
//! to timestamped report files.

pub mod cli;
pub mod config;
pub mod models;
pub mod parsers;
pub mod providers;
pub mod services;
pub mod store;
