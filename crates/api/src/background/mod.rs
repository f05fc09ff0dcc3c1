//! Background tasks.
//!
//! Each submodule owns a long-running task started from `main.rs`. All
//! tasks stop through a [`tokio_util::sync::CancellationToken`] for graceful
//! shutdown.

pub mod share_board;
