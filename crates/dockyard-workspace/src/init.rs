// ABOUTME: Cancelable wrapper for asynchronous initialization work
// ABOUTME: A canceled task resolves to an error and hands any late value to its cleanup

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

use dockyard_logging::debug;

use crate::error::InitError;

type Cleanup<T> = Arc<Mutex<Option<Box<dyn FnOnce(T) + Send>>>>;

/// Cancels the task it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    canceled: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.canceled.send_replace(true);
    }

    pub fn is_canceled(&self) -> bool {
        *self.canceled.borrow()
    }
}

/// Result of a task started with [`make_cancelable`].
pub struct Cancelable<T> {
    result: oneshot::Receiver<T>,
    canceled: watch::Receiver<bool>,
    cleanup: Cleanup<T>,
}

impl<T> Cancelable<T> {
    /// Wait for the task. Resolves to [`InitError::Canceled`] as soon as the
    /// task is canceled, even if it already produced a value; that value goes
    /// to the cleanup.
    pub async fn wait(mut self) -> Result<T, InitError> {
        let finished = tokio::select! {
            biased;
            Ok(()) = wait_for_cancel(&mut self.canceled) => None,
            result = &mut self.result => Some(result),
        };
        match finished {
            Some(Ok(value)) if !*self.canceled.borrow() => Ok(value),
            Some(Ok(value)) => {
                run_cleanup(&self.cleanup, value);
                Err(InitError::Canceled)
            }
            Some(Err(_)) => Err(InitError::Aborted),
            None => {
                if let Ok(value) = self.result.try_recv() {
                    run_cleanup(&self.cleanup, value);
                }
                Err(InitError::Canceled)
            }
        }
    }
}

async fn wait_for_cancel(canceled: &mut watch::Receiver<bool>) -> Result<(), watch::error::RecvError> {
    canceled.wait_for(|canceled| *canceled).await.map(|_| ())
}

fn run_cleanup<T>(cleanup: &Cleanup<T>, value: T) {
    let cleanup = cleanup.lock().take();
    match cleanup {
        Some(cleanup) => cleanup(value),
        None => debug!("Canceled task finished with no cleanup"),
    }
}

/// Run `future` on the current Tokio runtime so its result can be awaited or
/// abandoned.
pub fn make_cancelable<F>(future: F) -> Result<(Cancelable<F::Output>, CancelHandle), InitError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    spawn_cancelable(future, None)
}

/// Like [`make_cancelable`], passing the value of a task that finishes after
/// being canceled to `cleanup`.
pub fn make_cancelable_with_cleanup<F, C>(
    future: F,
    cleanup: C,
) -> Result<(Cancelable<F::Output>, CancelHandle), InitError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
    C: FnOnce(F::Output) + Send + 'static,
{
    spawn_cancelable(future, Some(Box::new(cleanup)))
}

fn spawn_cancelable<F>(
    future: F,
    cleanup: Option<Box<dyn FnOnce(F::Output) + Send>>,
) -> Result<(Cancelable<F::Output>, CancelHandle), InitError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| InitError::NoRuntime)?;
    let (result_tx, result_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cleanup: Cleanup<F::Output> = Arc::new(Mutex::new(cleanup));

    let task_canceled = cancel_rx.clone();
    let task_cleanup = cleanup.clone();
    runtime.spawn(async move {
        let value = future.await;
        if *task_canceled.borrow() {
            run_cleanup(&task_cleanup, value);
        } else if let Err(value) = result_tx.send(value) {
            // Nobody is waiting for the value any more.
            run_cleanup(&task_cleanup, value);
        }
    });

    Ok((
        Cancelable {
            result: result_rx,
            canceled: cancel_rx,
            cleanup,
        },
        CancelHandle {
            canceled: cancel_tx,
        },
    ))
}
