//! The publish algorithm.
//!
//! A dispatch pass runs up to three listener queues, most specific first:
//!
//! 1. the queue registered under the exact event name,
//! 2. the group queue (`aa.bb.*` for `aa.bb.cc`),
//! 3. the global wildcard queue (`*`).
//!
//! Each queue is sorted by priority before it runs. The pass stops at the
//! first listener that returns an error (the error is returned) or aborts
//! the event (no error).

use crate::event::name::{check_name, group_pattern, WILDCARD};
use crate::registry::Registry;
use crate::{Event, EventData, Result};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, debug_span, trace, Instrument, Span};

mod stats;

pub use stats::DispatcherStats;
use stats::Counters;

/// Configuration for the dispatcher
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Run at most one publish at a time
    pub enable_lock: bool,

    /// Wrap each publish in a `publish` tracing span
    pub enable_tracing: bool,
}

impl DispatcherConfig {
    /// Create a new dispatcher configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize publishes behind a lock
    pub fn enable_lock(mut self, enable: bool) -> Self {
        self.enable_lock = enable;
        self
    }

    /// Enable per-publish tracing spans
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }
}

/// Runs published events through the listeners of a [`Registry`].
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,

    /// Held for a whole publish while `lock_enabled` is set
    lock: Mutex<()>,
    lock_enabled: AtomicBool,

    enable_tracing: bool,
    counters: Counters,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    pub fn new(registry: Arc<Registry>, config: DispatcherConfig) -> Self {
        Self {
            registry,
            lock: Mutex::new(()),
            lock_enabled: AtomicBool::new(config.enable_lock),
            enable_tracing: config.enable_tracing,
            counters: Counters::default(),
        }
    }

    /// The registry this dispatcher reads from
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Turn the publish lock on or off
    pub fn set_lock_enabled(&self, enable: bool) {
        self.lock_enabled.store(enable, Ordering::SeqCst);
    }

    /// Whether publishes are serialized
    pub fn lock_enabled(&self) -> bool {
        self.lock_enabled.load(Ordering::SeqCst)
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStats {
        self.counters.snapshot()
    }

    /// Publish an event by name.
    ///
    /// The event is the registered prototype for `name` with `data` merged
    /// in, or a fresh event carrying `data`. When no queue can match the
    /// name, that event is returned without running anything.
    pub async fn publish(&self, name: &str, data: EventData) -> Result<Event> {
        let name = check_name(name)?;

        async {
            let _guard = self.acquire().await;

            if !self.has_route(name) {
                Counters::incr(&self.counters.unrouted);
                trace!(event = name, "No listeners found");
                return Ok(self.registry.instantiate(name, data));
            }

            let mut event = self.registry.instantiate(name, data);
            self.run(name, &mut event).await.map(|()| event)
        }
        .instrument(self.span(name))
        .await
    }

    /// Run a pre-built event through the listeners matching its name.
    pub async fn dispatch(&self, event: &mut Event) -> Result<()> {
        let name = check_name(event.name())?.to_string();

        async {
            let _guard = self.acquire().await;
            self.run(&name, event).await
        }
        .instrument(self.span(&name))
        .await
    }

    /// Whether any of the exact, group or global queues exists for `name`
    fn has_route(&self, name: &str) -> bool {
        if self.registry.has_listeners(name) || self.registry.has_listeners(WILDCARD) {
            return true;
        }

        group_pattern(name).is_some_and(|group| self.registry.has_listeners(&group))
    }

    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        if self.lock_enabled() {
            Some(self.lock.lock().await)
        } else {
            None
        }
    }

    fn span(&self, name: &str) -> Span {
        if self.enable_tracing {
            debug_span!("publish", event = name)
        } else {
            Span::none()
        }
    }

    async fn run(&self, name: &str, event: &mut Event) -> Result<()> {
        Counters::incr(&self.counters.published);
        event.abort(false);

        let phases = [Some(name.to_string()), group_pattern(name), Some(WILDCARD.to_string())];
        for key in phases.into_iter().flatten() {
            match self.run_queue(&key, event).await {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => {
                    Counters::incr(&self.counters.aborted);
                    debug!(event = name, queue = %key, "Event aborted by listener");
                    return Ok(());
                }
                Err(e) => {
                    Counters::incr(&self.counters.failed);
                    debug!(event = name, queue = %key, error = %e, "Listener failed");
                    return Err(e);
                }
            }
        }

        trace!(event = name, "Event dispatched");
        Ok(())
    }

    async fn run_queue(&self, key: &str, event: &mut Event) -> Result<ControlFlow<()>> {
        let Some(items) = self.registry.sorted_items(key) else {
            return Ok(ControlFlow::Continue(()));
        };

        for item in items {
            trace!(
                queue = key,
                priority = item.priority,
                listener = item.listener.name(),
                "Calling listener"
            );

            item.listener.handle(event).await?;
            if event.is_aborted() {
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{listener_fn, ListenerItem, ListenerRef};
    use crate::{Error, Priority};
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(Registry::new("test")), DispatcherConfig::new())
    }

    fn recorder(log: &Arc<SyncMutex<Vec<String>>>, tag: &str) -> ListenerRef {
        let log = log.clone();
        let tag = tag.to_string();
        listener_fn(move |_: &mut Event| {
            log.lock().push(tag.clone());
            Ok(())
        })
    }

    fn add(d: &Dispatcher, name: &str, priority: impl Into<i32>, listener: ListenerRef) {
        d.registry()
            .add_listener(name, ListenerItem::new(priority, listener))
            .unwrap();
    }

    #[test]
    fn test_dispatcher_config() {
        let config = DispatcherConfig::new().enable_lock(true).enable_tracing(true);
        assert!(config.enable_lock);
        assert!(config.enable_tracing);

        let d = Dispatcher::new(Arc::new(Registry::default()), config);
        assert!(d.lock_enabled());
        d.set_lock_enabled(false);
        assert!(!d.lock_enabled());
    }

    #[tokio::test]
    async fn test_priority_order() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(&d, "evt1", Priority::Low, recorder(&log, "B"));
        add(&d, "evt1", Priority::High, recorder(&log, "A"));
        add(&d, "evt1", 0, recorder(&log, "N"));

        d.publish("evt1", EventData::new()).await.unwrap();
        assert_eq!(*log.lock(), vec!["A", "N", "B"]);
    }

    #[tokio::test]
    async fn test_phase_order() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        // registration order is the reverse of the phase order
        add(&d, "*", Priority::Max, recorder(&log, "global"));
        add(&d, "app.*", Priority::Max, recorder(&log, "group"));
        add(&d, "app.evt1", Priority::Min, recorder(&log, "exact"));

        d.publish("app.evt1", EventData::new()).await.unwrap();
        assert_eq!(*log.lock(), vec!["exact", "group", "global"]);
    }

    #[tokio::test]
    async fn test_group_only() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));
        add(&d, "aa.bb.*", 0, recorder(&log, "group"));

        d.publish("aa.bb.cc", EventData::new()).await.unwrap();
        d.publish("aa.cc", EventData::new()).await.unwrap();
        d.publish("aa.bb.cc.dd", EventData::new()).await.unwrap();
        assert_eq!(*log.lock(), vec!["group"]);
    }

    #[tokio::test]
    async fn test_no_listener() {
        let d = dispatcher();
        let mut data = EventData::new();
        data.insert("k".into(), json!("v"));

        let event = d.publish("aa.bb.cc", data).await.unwrap();
        assert_eq!(event.name(), "aa.bb.cc");
        assert_eq!(event.get("k"), Some(&json!("v")));

        let stats = d.stats();
        assert_eq!(stats.unrouted, 1);
        assert_eq!(stats.published, 0);
    }

    #[tokio::test]
    async fn test_error_stops_later_phases() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(&d, "app.evt1", Priority::High, recorder(&log, "first"));
        add(&d, "app.evt1", 0, listener_fn(|_: &mut Event| Err(Error::handler("an error"))));
        add(&d, "app.evt1", Priority::Low, recorder(&log, "after"));
        add(&d, "app.*", 0, recorder(&log, "group"));
        add(&d, "*", 0, recorder(&log, "global"));

        let err = d.publish("app.evt1", EventData::new()).await.unwrap_err();
        assert_eq!(err, Error::handler("an error"));
        assert_eq!(*log.lock(), vec!["first"]);
        assert_eq!(d.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_group_error_skips_global() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(&d, "app.evt1", 0, recorder(&log, "exact"));
        add(&d, "app.*", 0, listener_fn(|_: &mut Event| Err(Error::handler("group failed"))));
        add(&d, "*", 0, recorder(&log, "global"));

        let err = d.publish("app.evt1", EventData::new()).await.unwrap_err();
        assert_eq!(err, Error::handler("group failed"));
        assert_eq!(*log.lock(), vec!["exact"]);
    }

    #[tokio::test]
    async fn test_group_abort_skips_global() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(&d, "app.evt1", 0, recorder(&log, "exact"));
        add(
            &d,
            "app.*",
            0,
            listener_fn(|e: &mut Event| {
                e.abort(true);
                Ok(())
            }),
        );
        add(&d, "*", 0, recorder(&log, "global"));

        let event = d.publish("app.evt1", EventData::new()).await.unwrap();
        assert!(event.is_aborted());
        assert_eq!(*log.lock(), vec!["exact"]);
        assert_eq!(d.stats().aborted, 1);
    }

    #[tokio::test]
    async fn test_trailing_dot_has_no_group() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(&d, "app.*", 0, recorder(&log, "group"));
        add(&d, "*", 0, recorder(&log, "global"));

        let event = d.publish("app.", EventData::new()).await.unwrap();
        assert_eq!(event.name(), "app.");
        assert!(!event.is_aborted());
        assert_eq!(*log.lock(), vec!["global"]);
    }

    #[tokio::test]
    async fn test_abort_stops_without_error() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));

        add(
            &d,
            "app.evt1",
            0,
            listener_fn(|e: &mut Event| {
                e.abort(true);
                Ok(())
            }),
        );
        add(&d, "app.evt1", Priority::Min, recorder(&log, "exact-later"));
        add(&d, "app.*", 0, recorder(&log, "group"));
        add(&d, "*", 0, recorder(&log, "global"));

        let event = d.publish("app.evt1", EventData::new()).await.unwrap();
        assert!(event.is_aborted());
        assert!(log.lock().is_empty());
        assert_eq!(d.stats().aborted, 1);
    }

    #[tokio::test]
    async fn test_abort_flag_is_reset() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));
        add(&d, "evt1", 0, recorder(&log, "ran"));

        let mut event = Event::named("evt1");
        event.abort(true);
        d.dispatch(&mut event).await.unwrap();
        assert!(!event.is_aborted());
        assert_eq!(*log.lock(), vec!["ran"]);
    }

    #[tokio::test]
    async fn test_prototype_is_used() {
        let d = dispatcher();
        let mut proto = Event::named("evt2");
        proto.set("from", "proto");
        d.registry().add_event(proto).unwrap();

        add(
            &d,
            "evt2",
            Priority::AboveNormal,
            listener_fn(|e: &mut Event| {
                assert_eq!(e.name(), "evt2");
                assert_eq!(e.get("k"), Some(&json!("v")));
                e.set("seen", true);
                Ok(())
            }),
        );

        let mut data = EventData::new();
        data.insert("k".into(), json!("v"));
        let event = d.publish("evt2", data).await.unwrap();
        assert_eq!(event.get("from"), Some(&json!("proto")));
        assert_eq!(event.get("seen"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let d = dispatcher();
        let err = d.publish("++df", EventData::new()).await.unwrap_err();
        assert!(err.is_config_error());

        let mut event = Event::default();
        assert!(d.dispatch(&mut event).await.unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn test_trimmed_name() {
        let d = dispatcher();
        let log = Arc::new(SyncMutex::new(Vec::new()));
        add(&d, "evt1", 0, recorder(&log, "ran"));

        let event = d.publish("  evt1  ", EventData::new()).await.unwrap();
        assert_eq!(event.name(), "evt1");
        assert_eq!(*log.lock(), vec!["ran"]);
    }

    #[tokio::test]
    async fn test_listener_can_register_during_dispatch() {
        let d = Arc::new(dispatcher());
        let registry = d.registry().clone();

        add(
            &d,
            "evt1",
            0,
            listener_fn(move |_: &mut Event| {
                registry.add_listener("evt1", ListenerItem::new(0, listener_fn(|_: &mut Event| Ok(()))))
            }),
        );

        d.publish("evt1", EventData::new()).await.unwrap();
        assert_eq!(d.registry().listener_count("evt1"), 2);
    }

    #[tokio::test]
    async fn test_lock_serializes_publishes() {
        use std::sync::atomic::AtomicUsize;
        use std::time::Duration;

        struct Overlap {
            active: AtomicUsize,
            max_seen: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl crate::Listener for Arc<Overlap> {
            async fn handle(&self, _event: &mut Event) -> Result<()> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let overlap = Arc::new(Overlap {
            active: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let d = Arc::new(Dispatcher::new(
            Arc::new(Registry::new("test")),
            DispatcherConfig::new().enable_lock(true),
        ));
        add(&d, "evt1", 0, Arc::new(overlap.clone()));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let d = d.clone();
                tokio::spawn(async move { d.publish("evt1", EventData::new()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(overlap.max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(d.stats().published, 4);
    }
}
