//! Blind OCR Server Library
//!
//! HTTP backend that OCRs uploaded PDFs and images and keeps an append-only
//! log of every processing attempt. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `ocr`: Rasterization, image decoding and OCR providers
//! - `pipeline`: Upload -> extract -> log -> respond orchestration
//! - `db`: SQLite request log
//! - `routes`: HTTP endpoints

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod routes;
pub mod state;
