//! The single seam every fallible operation reports through.
//!
//! Nothing inside the client decides on its own whether a failure is fatal: the configured
//! [`ErrorHandler`] does. Returning `Err` aborts the operation at the call site, returning
//! `Ok(())` lets the operation carry on with whatever partial state it has.
use crate::error::Error;
use log::error;
use std::fmt::Debug;

pub trait ErrorHandler: Debug + Send + Sync {
    fn handle(&self, error: Error) -> Result<(), Error>;
}

/// Propagates every failure to the caller. This is the default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowHandler;

impl ErrorHandler for ThrowHandler {
    fn handle(&self, error: Error) -> Result<(), Error> {
        Err(error)
    }
}

/// Logs the failure and hands control back, so reads may come back truncated or empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

impl ErrorHandler for LogHandler {
    fn handle(&self, error: Error) -> Result<(), Error> {
        error!("{}", error);
        Ok(())
    }
}
