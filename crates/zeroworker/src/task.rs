//! Keep-alive handles for lifecycle work

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use zerostore::{Error, Result};

/// A lifecycle operation running on the runtime
///
/// The work is spawned when the handle is created and runs to completion
/// whether or not the handle is awaited. Dropping the handle detaches it;
/// awaiting it yields the operation's result.
#[derive(Debug)]
pub struct KeepAlive<T> {
    task: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> KeepAlive<T> {
    /// Spawn `work` on the current tokio runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            task: tokio::spawn(work),
        }
    }

    /// Whether the operation has finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for KeepAlive<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(Error::Aborted(e.to_string())),
        })
    }
}
