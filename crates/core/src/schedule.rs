use std::{future::Future, thread, time::Duration};

use tokio::runtime::Handle;

pub const DEFAULT_ASYNC_DELAY: Duration = Duration::from_millis(50);

/// Run `task` no earlier than `delay` from now, without blocking the caller.
///
/// Inside a Tokio runtime the task is spawned behind a timer. Otherwise a
/// detached thread sleeps and then drives it to completion. There is no
/// handle and no ordering between deferred tasks. Returns `false` if the task
/// could not be scheduled at all.
pub fn defer<F>(delay: Duration, task: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                task.await;
            });
            true
        }
        Err(_) => thread::Builder::new()
            .name("cd-metrics-deferred".to_string())
            .spawn(move || {
                thread::sleep(delay);
                futures::executor::block_on(task);
            })
            .is_ok(),
    }
}
