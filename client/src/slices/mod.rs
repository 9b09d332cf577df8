//! Resource slices.
//!
//! Each slice owns one entity collection (or singleton) and its async
//! operation lifecycle, exposed as the uniform `{data, loading, error}`
//! shape. Commands flip the slice into its pending state and return an
//! effect that calls the REST adapter; the response action applies the
//! payload (fulfilled) or records an error string (rejected). On failure
//! stale data is always retained - only `loading`/`error` flip.

pub mod config;
pub mod knowledge_base;
pub mod session;
pub mod tickets;
