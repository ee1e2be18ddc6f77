//! Optimistic update protocol over any cloneable state.
//!
//! One mutation runs in three phases:
//!
//! 1. snapshot the current state and apply the speculative patch
//! 2. await the remote call
//! 3. on success fold the server answer in, on failure put the snapshot back
//!
//! The patch is visible to readers before the remote call is first polled.
//! Mutations are serialized, so a rollback never discards another
//! mutation's speculative work.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::error::ClientError;

type ChangeCallback<S> = Box<dyn Fn(&S) + Send + Sync>;

pub struct Optimistic<S> {
    state: Arc<RwLock<S>>,
    in_flight: Mutex<()>,
    on_change: Arc<Mutex<Option<ChangeCallback<S>>>>,
}

impl<S> Optimistic<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            in_flight: Mutex::new(()),
            on_change: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn current(&self) -> S {
        self.state.read().await.clone()
    }

    /// Non-blocking read for render paths; `None` only while a write is underway.
    pub fn try_current(&self) -> Option<S> {
        self.state.try_read().ok().map(|s| s.clone())
    }

    /// Called with the new state after every patch, reconcile and rollback.
    pub async fn set_on_change<F>(&self, callback: F)
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let mut on_change = self.on_change.lock().await;
        *on_change = Some(Box::new(callback));
    }

    /// Replace the state outright, e.g. after a fresh fetch.
    pub async fn reset(&self, state: S) {
        let _guard = self.in_flight.lock().await;
        self.set_state(state).await;
    }

    async fn set_state(&self, new_state: S) {
        {
            let mut state = self.state.write().await;
            *state = new_state.clone();
        }

        let callback = self.on_change.lock().await;
        if let Some(ref cb) = *callback {
            cb(&new_state);
        }
    }

    /// Run one optimistic mutation.
    ///
    /// A failing `patch` leaves the state untouched and `call` is never
    /// invoked. A failing `call` restores the pre-patch snapshot exactly,
    /// before the error is returned.
    pub async fn mutate<T, P, C, Fut, R>(
        &self,
        patch: P,
        call: C,
        reconcile: R,
    ) -> Result<T, ClientError>
    where
        P: FnOnce(&S) -> Result<S, ClientError>,
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
        R: FnOnce(&mut S, &T),
    {
        let _guard = self.in_flight.lock().await;

        let snapshot = self.current().await;
        let patched = patch(&snapshot)?;
        self.set_state(patched).await;

        match call().await {
            Ok(answer) => {
                let mut reconciled = self.current().await;
                reconcile(&mut reconciled, &answer);
                self.set_state(reconciled).await;
                Ok(answer)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote mutation failed, rolling back");
                self.set_state(snapshot).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i64,
        confirmed: bool,
    }

    fn counter() -> Arc<Optimistic<Counter>> {
        Arc::new(Optimistic::new(Counter {
            value: 10,
            confirmed: true,
        }))
    }

    #[tokio::test]
    async fn patch_is_visible_while_call_is_pending() {
        let state = counter();
        let inside = Arc::clone(&state);

        let answer = state
            .mutate(
                |s| {
                    Ok(Counter {
                        value: s.value + 5,
                        confirmed: false,
                    })
                },
                || async move {
                    let seen = inside.current().await;
                    assert_eq!(seen.value, 15);
                    assert!(!seen.confirmed);
                    Ok(16)
                },
                |s, server: &i64| {
                    s.value = *server;
                    s.confirmed = true;
                },
            )
            .await
            .unwrap();

        assert_eq!(answer, 16);
        assert_eq!(
            state.current().await,
            Counter {
                value: 16,
                confirmed: true
            }
        );
    }

    #[tokio::test]
    async fn failure_restores_snapshot() {
        let state = counter();
        let before = state.current().await;

        let result: Result<(), _> = state
            .mutate(
                |s| {
                    Ok(Counter {
                        value: s.value - 100,
                        confirmed: false,
                    })
                },
                || async { Err(ClientError::Transport("connection refused".into())) },
                |_, _| panic!("reconcile must not run on failure"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(state.current().await, before);
    }

    #[tokio::test]
    async fn failed_patch_skips_the_call() {
        let state = counter();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let result: Result<(), _> = state
            .mutate(
                |_| Err(ClientError::Local(gangbook_domain::DomainError::validation("bad"))),
                || async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                |_, _| {},
            )
            .await;

        assert!(matches!(result, Err(ClientError::Local(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.current().await.value, 10);
    }

    #[tokio::test]
    async fn observers_see_patch_then_rollback() {
        let state = counter();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state
            .set_on_change(move |s: &Counter| sink.lock().unwrap().push(s.value))
            .await;

        let _: Result<(), _> = state
            .mutate(
                |s| {
                    Ok(Counter {
                        value: s.value + 1,
                        confirmed: false,
                    })
                },
                || async { Err(ClientError::Http { status: 500, body: String::new() }) },
                |_, _| {},
            )
            .await;

        assert_eq!(*seen.lock().unwrap(), vec![11, 10]);
    }
}
