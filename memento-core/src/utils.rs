//! Detached background work: expiration timers and deferred stores.
//!
//! Work is spawned on the ambient tokio runtime when there is one, so it runs
//! on that runtime's clock. A runtime drops its unfinished tasks when it shuts
//! down; any timer or store dropped that way is handed over to a background
//! runtime owned by this crate. Work submitted outside any runtime goes to
//! the background runtime directly.

use once_cell::sync::OnceCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{error, trace};

static BACKGROUND: OnceCell<Option<Runtime>> = OnceCell::new();

/// The shared background runtime, built on first use.
///
/// A single worker thread serves every timer and deferred store, however many
/// are outstanding.
fn background() -> Option<&'static Runtime> {
    BACKGROUND
        .get_or_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("memento-background")
                .enable_time()
                .build()
                .map_err(|err| error!(%err, "failed to start background runtime"))
                .ok()
        })
        .as_ref()
}

fn spawn_background<Fut>(future: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    match background() {
        Some(runtime) => {
            runtime.spawn(future);
        }
        None => error!("background runtime unavailable, detached work dropped"),
    }
}

fn run_at_background<F>(deadline: Instant, task: F)
where
    F: FnOnce() + Send + 'static,
{
    spawn_background(async move {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        task();
    });
}

/// A pending timer on the ambient runtime. Dropped before firing, it
/// reschedules itself on the background runtime for the time remaining.
struct Timer<F: FnOnce() + Send + 'static> {
    deadline: Instant,
    task: Option<F>,
}

impl<F: FnOnce() + Send + 'static> Timer<F> {
    fn fire(mut self) {
        if let Some(task) = self.task.take() {
            task();
        }
    }
}

impl<F: FnOnce() + Send + 'static> Drop for Timer<F> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            trace!("timer outlived its runtime, moving to background");
            run_at_background(self.deadline, task);
        }
    }
}

/// Runs `task` once `delay` has elapsed. The task cannot be cancelled.
pub(crate) fn run_after<F>(delay: Duration, task: F)
where
    F: FnOnce() + Send + 'static,
{
    let deadline = Instant::now() + delay;
    match Handle::try_current() {
        Ok(handle) => {
            let timer = Timer {
                deadline,
                task: Some(task),
            };
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                timer.fire();
            });
        }
        Err(_) => run_at_background(deadline, task),
    }
}

/// A future on the ambient runtime that moves to the background runtime when
/// dropped unfinished.
struct Detached<Fut: Future<Output = ()> + Send + 'static> {
    future: Option<Pin<Box<Fut>>>,
}

impl<Fut: Future<Output = ()> + Send + 'static> Future for Detached<Fut> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // Taken out while polling so that a panic leaves nothing to hand over.
        let Some(mut future) = self.future.take() else {
            return Poll::Ready(());
        };
        match future.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(()),
            Poll::Pending => {
                self.future = Some(future);
                Poll::Pending
            }
        }
    }
}

impl<Fut: Future<Output = ()> + Send + 'static> Drop for Detached<Fut> {
    fn drop(&mut self) {
        if let Some(future) = self.future.take() {
            trace!("detached work outlived its runtime, moving to background");
            spawn_background(future);
        }
    }
}

/// Drives `future` to completion in the background.
///
/// A panic inside the future stays inside its task.
pub(crate) fn spawn_detached<Fut>(future: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(Detached {
                future: Some(Box::pin(future)),
            });
        }
        Err(_) => spawn_background(future),
    }
}
