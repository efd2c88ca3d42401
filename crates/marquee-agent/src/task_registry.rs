//! Task registry for background intake bridges.
//!
//! Every task the pipeline spawns besides the coordinator itself is tracked
//! here so shutdown can stop all of them at once.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct TaskRegistry {
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn `fut`, racing it against registry shutdown.
    pub fn spawn_cancellable<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            if *shutdown_rx.borrow() {
                return;
            }
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                _ = fut => {}
            }
        });
        let mut handles = self.handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    /// Tasks that have not finished yet.
    pub fn active(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_pending_tasks() {
        let registry = TaskRegistry::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<u32>();
        registry.spawn_cancellable(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(1);
        });
        assert_eq!(registry.active(), 1);

        registry.shutdown();
        assert!(registry.is_shut_down());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(rx.recv().await, None);
        assert_eq!(registry.active(), 0);
    }

    #[tokio::test]
    async fn finished_tasks_are_pruned() {
        let registry = TaskRegistry::new();
        registry.spawn_cancellable(async {});
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        registry.spawn_cancellable(std::future::pending());
        assert_eq!(registry.active(), 1);
    }
}
