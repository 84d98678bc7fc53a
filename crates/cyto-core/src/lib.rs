//! Core types, statistics and analyses for the cytometry pipeline.
//!
//! This crate is deliberately free of database, file-format and HTTP
//! dependencies. Storage backends implement [`store::CytometryStore`]; the
//! analyses in [`analysis`] are written against that trait.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod cohort;
pub mod error;
pub mod population;
pub mod sample;
pub mod stats;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
