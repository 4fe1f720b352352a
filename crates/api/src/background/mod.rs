//! Background tasks.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned on the state's task tracker. All tasks accept a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) for graceful
//! shutdown.

pub mod kernel_watch;
