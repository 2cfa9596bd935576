//! # MSSQL Scope MCP
//!
//! A Model Context Protocol (MCP) gateway that exposes named, access-scoped
//! views ("instances") of a Microsoft SQL Server database.
//!
//! Each instance carries an allow-list of schemas and tables. The gateway
//! renders a compact, LLM-consumable description of the allowed portion of a
//! curated table catalog, and executes caller-supplied queries against the
//! live database.
//!
//! ## Architecture
//!
//! - A single shared connection to the backing store, reconnected on demand
//! - INFORMATION_SCHEMA-driven metadata inspection
//! - A fixed curated table catalog intersected with per-instance allow-lists
//! - Three MCP tools: `generate_sql_query`, `get_database_context`,
//!   `execute_query`
//!
//! The free-form query path is a deliberate open gateway: query text is
//! executed as-is, with no validation or sanitization. Access control is the
//! catalog/allow-list scoping of what the gateway will *describe*, not what
//! it will *execute*.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod context;
pub mod database;
pub mod error;
pub mod llm;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::ServerError;
pub use server::ScopeMcpServer;
