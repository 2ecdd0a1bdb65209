//! # ddb-query
//!
//! A stateless SQL engine that executes a MySQL-flavored dialect directly against
//! structured data files — delimited text, JSON object arrays, JSON Lines streams,
//! YAML document lists, and Parquet columnar files — without fully materializing the
//! source into memory.
//!
//! ## Pipeline
//!
//! ```text
//! SQL text --[lexer]--> tokens --[parser]--> QueryPlan --[dispatch]--> ResultSet
//!                                                  |
//!                                     reader + format --> streaming Row chunks
//! ```
//!
//! [`dispatch::execute`] is the single entry point: it parses the SQL text, resolves the
//! named tables against their [`config::TableConfig`], and routes to the streaming,
//! join, or write executor in [`exec`] depending on statement shape.
//!
//! Large delimited and JSON-Lines tables can be read by a pool of worker threads in
//! parallel (`reader::parallel`); every other format is read sequentially. See
//! `SPEC_FULL.md` for the full contract.

pub mod ast;
pub mod chunk;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod exec;
pub mod format;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod plan;
pub mod reader;
pub mod row;
pub mod value;

pub use config::{Column, DataType, Format, TableConfig, TableConfigMap};
pub use dispatch::execute;
pub use error::EngineError;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use plan::{QueryPlan, ResultSet};
pub use row::Row;
pub use value::Value;
