//! # Supervisor: spawns the worker population, routes messages, stops gracefully.
//!
//! The [`Supervisor`] owns every piece of mutable runtime state (slots,
//! counters, phase) and mutates it from a single loop. Worker threads, the
//! startup timer, deferred pool captures and [`SupervisorHandle`]s talk to it
//! through one inbox of signals.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   start() ── spawn slot 0 .. count-1 (ascending) ──► worker threads
//!
//!   loop {
//!     inbox ◄── Worker { Online | Message | Exit(code) }   (worker threads)
//!           ◄── Dispatch { to, message }                    (exclusive captures)
//!           ◄── StartupDeadline                             (startup timer)
//!           ◄── Shutdown { reason }                         (handle)
//!           ◄── Interrupt { trigger }                       (stdin 0x03, raw mode)
//!     os    ◄── SIGINT / SIGTERM
//!   }
//!
//! Online   → starting += 1 (first time per slot); starting == count → arm deadline
//! Message  → Router::route(from, msg)
//!              ├─ Started           → active += 1; active == count → disarm, AllStarted
//!              ├─ Forward{to, msg}  → post to slot `to` (port moves along)
//!              └─ Handled
//! Exit     → active -= 1 if it was started
//!              ├─ code != 0 and running → respawn same slot (WorkerRestarting)
//!              └─ no live worker left   → AllStopped, run() returns
//!
//! Shutdown: phase = Stopping → ShutdownRequested → post "stop" to every live worker
//! Interrupt (signal or 0x03) while Stopping → run() fails with Interrupted
//! ```
//!
//! ## Event flow
//! ```text
//! Supervisor / capture tasks ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//! ```
//! The listener is closed (and the subscriber queues drained) before
//! [`Supervisor::run`] returns.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::core::{
    Population, Role, Signal, SlotInfo, WorkerEvent,
    handle::{WorkerHandle, WorkerState},
    router::{Route, Router},
    shutdown,
    startup::Startup,
};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::messages::{InvokeName, Message};
use crate::pool::WorkerPool;
use crate::subscribers::SubscriberSet;
use crate::workers::WorkerRef;

/// Shutdown reason reported by [`SupervisorHandle::shutdown`].
const HANDLE_REASON: &str = "shutdown requested by handle";

/// Supervisor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    /// Finalization: exits are no longer respawned.
    Stopping,
}

/// Whether the run loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Finished,
}

/// What woke the run loop.
enum Wake {
    Inbox(Option<Signal>),
    Os(std::io::Result<&'static str>),
}

/// One fixed position of the population.
struct Slot {
    info: SlotInfo,
    handle: Option<WorkerHandle>,
    generation: u64,
    restarts: u64,
    online_seen: bool,
}

/// Bus listener feeding the subscriber set.
struct Listener {
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl Listener {
    fn spawn(bus: &Bus, set: SubscriberSet) -> Self {
        let mut rx = bus.subscribe();
        let stop = CancellationToken::new();
        let token = stop.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(ev),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "event listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(ev);
                        }
                        break;
                    }
                }
            }
            drop(rx);
            set.shutdown().await;
        });
        Self { stop, task }
    }

    /// Forwards what is already published, then drains every subscriber queue.
    async fn close(self) {
        self.stop.cancel();
        let _ = self.task.await;
    }
}

/// Cloneable handle that asks a running supervisor to stop.
#[derive(Clone, Debug)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<Signal>,
}

impl SupervisorHandle {
    /// Starts the graceful shutdown; repeated calls are ignored.
    ///
    /// Returns `false` if the supervisor already finished.
    pub fn shutdown(&self) -> bool {
        self.tx
            .send(Signal::Shutdown {
                reason: HANDLE_REASON,
            })
            .is_ok()
    }
}

/// Owns the worker population and drives its lifecycle.
pub struct Supervisor {
    population: Population,
    worker: WorkerRef,
    slots: Vec<Slot>,
    pool: WorkerPool<usize>,
    router: Router,
    startup: Startup,
    active: usize,
    starting: usize,
    phase: Phase,
    bus: Bus,
    listener: Listener,
    watch_stdin: bool,
    signals_tx: mpsc::UnboundedSender<Signal>,
    signals_rx: mpsc::UnboundedReceiver<Signal>,
}

impl Supervisor {
    /// Creates a supervisor; see [`SupervisorBuilder`](crate::SupervisorBuilder).
    ///
    /// Must be called inside a tokio runtime.
    pub(crate) fn new_internal(
        cfg: Config,
        worker: WorkerRef,
        bus: Bus,
        subs: SubscriberSet,
        watch_stdin: bool,
    ) -> Self {
        let population = Population::new(&cfg.server);
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let pool = WorkerPool::new(cfg.server.workers.wait());
        let router = Router::new(
            population.scheduler_id(),
            pool.clone(),
            signals_tx.clone(),
            bus.clone(),
        );
        let listener = Listener::spawn(&bus, subs);
        let slots = population
            .slots()
            .map(|info| Slot {
                info,
                handle: None,
                generation: 0,
                restarts: 0,
                online_seen: false,
            })
            .collect();

        Self {
            startup: Startup::new(cfg.server.timeouts.start_timeout()),
            population,
            worker,
            slots,
            pool,
            router,
            active: 0,
            starting: 0,
            phase: Phase::Running,
            bus,
            listener,
            watch_stdin,
            signals_tx,
            signals_rx,
        }
    }

    /// Total number of worker slots.
    pub fn count(&self) -> usize {
        self.population.count()
    }

    /// Slot id of the scheduler.
    pub fn scheduler_id(&self) -> usize {
        self.population.scheduler_id()
    }

    /// Number of workers currently started.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Number of slots that reported online at least once.
    pub fn starting(&self) -> usize {
        self.starting
    }

    /// Slot layout.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Returns a handle that can stop the supervisor from elsewhere.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle {
            tx: self.signals_tx.clone(),
        }
    }

    /// Subscribes to runtime events; only events published afterwards are seen.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Spawns every slot, then serves the inbox until no worker is left.
    ///
    /// Returns `Ok(())` after a full stop; the subscriber set is drained before returning.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        let terminal = self.watch_terminal();
        let res = self.drive().await;
        drop(terminal);
        self.listener.close().await;
        res
    }

    /// Raw-mode guard for the interrupt byte watcher, if one was started.
    fn watch_terminal(&self) -> Option<shutdown::RawMode> {
        if !self.watch_stdin || !shutdown::is_interactive() {
            return None;
        }
        match shutdown::watch_interrupt_byte(self.signals_tx.clone()) {
            Ok(raw) => Some(raw),
            Err(err) => {
                warn!(error = %err, "stdin interrupt watcher unavailable");
                None
            }
        }
    }

    async fn drive(&mut self) -> Result<(), RuntimeError> {
        let mut os_signals = shutdown::ShutdownSignals::new().map_err(RuntimeError::Signal)?;
        self.start()?;

        loop {
            let wake = tokio::select! {
                sig = self.signals_rx.recv() => Wake::Inbox(sig),
                res = os_signals.recv() => Wake::Os(res),
            };

            let flow = match wake {
                Wake::Inbox(Some(signal)) => self.on_signal(signal)?,
                // Unreachable while `self` keeps a sender.
                Wake::Inbox(None) => Flow::Finished,
                Wake::Os(Ok(name)) => self.on_interrupt(name)?,
                Wake::Os(Err(err)) => return Err(RuntimeError::Signal(err)),
            };
            if flow == Flow::Finished {
                return Ok(());
            }
        }
    }

    /// Spawns slots `0..count` in ascending order.
    fn start(&mut self) -> Result<(), RuntimeError> {
        for id in 0..self.count() {
            self.spawn(id)?;
        }
        Ok(())
    }

    fn spawn(&mut self, id: usize) -> Result<(), RuntimeError> {
        let slot = &mut self.slots[id];
        slot.generation += 1;
        let handle = WorkerHandle::spawn(
            slot.info,
            slot.generation,
            Arc::clone(&self.worker),
            self.signals_tx.clone(),
        )
        .map_err(|source| RuntimeError::Spawn { slot: id, source })?;
        slot.handle = Some(handle);

        if slot.info.role == Role::PoolWorker {
            self.pool.add(id);
        }
        self.bus.publish(
            Event::new(EventKind::WorkerSpawned)
                .with_slot(id)
                .with_role(slot.info.role)
                .with_generation(slot.generation),
        );
        Ok(())
    }

    fn on_signal(&mut self, signal: Signal) -> Result<Flow, RuntimeError> {
        match signal {
            Signal::Worker {
                id,
                generation,
                event,
            } => match event {
                WorkerEvent::Online => {
                    self.on_online(id, generation);
                    Ok(Flow::Continue)
                }
                WorkerEvent::Message(message) => {
                    self.on_message(id, generation, message);
                    Ok(Flow::Continue)
                }
                WorkerEvent::Exit(code) => self.on_exit(id, generation, code),
            },
            Signal::Dispatch { to, message } => {
                self.deliver(to, message);
                Ok(Flow::Continue)
            }
            Signal::StartupDeadline => {
                self.on_startup_deadline();
                Ok(Flow::Continue)
            }
            Signal::Shutdown { reason } => Ok(self.begin_shutdown(reason)),
            Signal::Interrupt { trigger } => self.on_interrupt(trigger),
        }
    }

    /// First interrupt stops gracefully; another one while stopping aborts the run.
    fn on_interrupt(&mut self, trigger: &'static str) -> Result<Flow, RuntimeError> {
        match self.phase {
            Phase::Running => Ok(self.begin_shutdown(trigger)),
            Phase::Stopping => {
                warn!(trigger, live = self.live(), "interrupted again, abandoning workers");
                Err(RuntimeError::Interrupted { trigger })
            }
        }
    }

    /// Live handle of slot `id` with the given generation.
    fn current(&mut self, id: usize, generation: u64) -> Option<&mut WorkerHandle> {
        self.slots
            .get_mut(id)?
            .handle
            .as_mut()
            .filter(|h| h.generation() == generation)
    }

    fn on_online(&mut self, id: usize, generation: u64) {
        let count = self.count();
        let Some(handle) = self.current(id, generation) else {
            return;
        };
        handle.set_state(WorkerState::Online);
        let info = handle.slot();
        self.bus.publish(
            Event::new(EventKind::WorkerOnline)
                .with_slot(id)
                .with_role(info.role)
                .with_generation(generation),
        );

        let slot = &mut self.slots[id];
        if slot.online_seen {
            return;
        }
        slot.online_seen = true;
        self.starting += 1;

        if self.starting == count && self.active != count && self.phase == Phase::Running {
            self.startup.arm(&self.signals_tx);
        }
    }

    fn on_message(&mut self, from: usize, generation: u64, message: Message) {
        match self.router.route(from, message) {
            Route::Started => self.on_started(from, generation),
            Route::Forward { to, message } => self.deliver(to, message),
            Route::Handled => {}
        }
    }

    fn on_started(&mut self, id: usize, generation: u64) {
        let count = self.count();
        let Some(handle) = self.current(id, generation) else {
            return;
        };
        if handle.state() == WorkerState::Started {
            return;
        }
        handle.set_state(WorkerState::Started);
        let role = handle.slot().role;
        self.active += 1;

        self.bus.publish(
            Event::new(EventKind::WorkerStarted)
                .with_slot(id)
                .with_role(role)
                .with_generation(generation)
                .with_active(self.active),
        );
        if self.active == count {
            self.startup.disarm();
            self.bus
                .publish(Event::new(EventKind::AllStarted).with_active(self.active));
        }
    }

    fn on_exit(&mut self, id: usize, generation: u64, code: i32) -> Result<Flow, RuntimeError> {
        let Some(slot) = self.slots.get_mut(id) else {
            return Err(RuntimeError::AlreadyStopped { slot: id });
        };
        let Some(mut handle) = slot.handle.take_if(|h| h.generation() == generation) else {
            return Err(RuntimeError::AlreadyStopped { slot: id });
        };
        let was_started = handle.state() == WorkerState::Started;
        handle.set_state(WorkerState::Exited);
        drop(handle);

        let role = slot.info.role;
        if was_started {
            self.active -= 1;
        }
        self.bus.publish(
            Event::new(EventKind::WorkerExited)
                .with_slot(id)
                .with_role(role)
                .with_generation(generation)
                .with_code(code)
                .with_active(self.active),
        );

        if role == Role::PoolWorker && self.pool.is_captured(&id) {
            let _ = self.pool.release(&id);
        }

        if code != 0 && self.phase == Phase::Running {
            self.respawn(id, code)?;
            return Ok(Flow::Continue);
        }
        Ok(self.finish_if_idle())
    }

    /// Immediate, unbounded restart of a crashed slot.
    fn respawn(&mut self, id: usize, code: i32) -> Result<(), RuntimeError> {
        let slot = &mut self.slots[id];
        slot.restarts += 1;
        self.bus.publish(
            Event::new(EventKind::WorkerRestarting)
                .with_slot(id)
                .with_role(slot.info.role)
                .with_generation(slot.generation + 1)
                .with_code(code),
        );
        self.spawn(id)
    }

    /// Posts a routed message; the requester's port gets an error if the target is gone.
    fn deliver(&mut self, to: usize, message: Message) {
        let posted = match self.slots.get(to).and_then(|s| s.handle.as_ref()) {
            Some(handle) => handle.post(message),
            None => Err(message),
        };
        let Err(message) = posted else {
            return;
        };

        self.bus.publish(
            Event::new(EventKind::DeliveryFailed)
                .with_slot(to)
                .with_reason(message.kind()),
        );
        if let Some(port) = message.port() {
            port.fail(format!("Worker {to} unavailable"));
        }
        if let Message::Invoke {
            name: InvokeName::Request,
            exclusive: true,
            ..
        } = message
        {
            let _ = self.pool.release(&to);
        }
    }

    fn on_startup_deadline(&mut self) {
        if !self.startup.expire() || self.active == self.count() {
            return;
        }
        let pending: Vec<String> = self
            .slots
            .iter()
            .filter(|s| {
                s.handle
                    .as_ref()
                    .is_none_or(|h| h.state() != WorkerState::Started)
            })
            .map(|s| format!("{} ({})", s.info.id, s.info.role))
            .collect();

        self.bus.publish(
            Event::new(EventKind::StartupTimeout)
                .with_active(self.active)
                .with_reason(pending.join(", ")),
        );
    }

    /// Enters finalization and broadcasts `stop` to every live worker.
    fn begin_shutdown(&mut self, reason: &'static str) -> Flow {
        if self.phase == Phase::Stopping {
            return Flow::Continue;
        }
        self.phase = Phase::Stopping;
        self.startup.disarm();
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));

        for handle in self.slots.iter().filter_map(|s| s.handle.as_ref()) {
            // A closed inbox means the exit report is already queued.
            let _ = handle.post(Message::stop());
        }
        self.finish_if_idle()
    }

    fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.handle.is_some()).count()
    }

    fn finish_if_idle(&self) -> Flow {
        if self.live() > 0 {
            return Flow::Continue;
        }
        self.bus.publish(Event::new(EventKind::AllStopped));
        Flow::Finished
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{ServerConfig, TimeoutsConfig, WorkersConfig};
    use crate::error::WorkerError;
    use crate::workers::{WorkerContext, WorkerFn};

    fn config(ports: &[u16], pool: usize, start_ms: u64) -> Config {
        Config::new(ServerConfig {
            balancer: false,
            ports: ports.to_vec(),
            workers: WorkersConfig {
                pool,
                wait: Some(100),
            },
            timeouts: TimeoutsConfig { start: start_ms },
        })
    }

    fn supervisor(cfg: Config, worker: WorkerRef) -> Supervisor {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(Vec::new(), bus.clone());
        Supervisor::new_internal(cfg, worker, bus, subs, false)
    }

    /// Serves the inbox until `done` holds; records `active` after every signal.
    async fn pump_until(
        sup: &mut Supervisor,
        mut done: impl FnMut(&Supervisor) -> bool,
    ) -> Vec<usize> {
        let mut history = Vec::new();
        while !done(sup) {
            let signal = tokio::time::timeout(Duration::from_secs(5), sup.signals_rx.recv())
                .await
                .expect("supervisor inbox stalled")
                .expect("inbox closed");
            let flow = sup.on_signal(signal).unwrap();
            history.push(sup.active);
            if flow == Flow::Finished {
                break;
            }
        }
        history
    }

    fn idle_worker() -> WorkerRef {
        WorkerFn::arc(|mut ctx: WorkerContext| async move {
            ctx.started();
            ctx.stopped().await;
            Ok::<_, WorkerError>(())
        })
    }

    #[tokio::test]
    async fn spawns_population_and_counts_started() {
        let mut sup = supervisor(config(&[8001, 8002], 1, 30_000), idle_worker());
        assert_eq!(sup.count(), 4);
        assert_eq!(sup.scheduler_id(), 2);

        sup.start().unwrap();
        assert_eq!(sup.live(), 4);
        assert_eq!(sup.pool.size(), 1);

        pump_until(&mut sup, |s| s.active == 4).await;
        assert_eq!(sup.starting(), 4);
        assert!(!sup.startup.is_armed());

        assert_eq!(sup.begin_shutdown("test"), Flow::Continue);
        assert_eq!(sup.begin_shutdown("again"), Flow::Continue);
        pump_until(&mut sup, |s| s.live() == 0).await;
        assert_eq!(sup.active(), 0);
    }

    #[tokio::test]
    async fn crash_respawns_same_slot_once() {
        let worker = WorkerFn::arc(|mut ctx: WorkerContext| async move {
            ctx.started();
            while let Some(msg) = ctx.recv().await {
                if msg.is_stop() {
                    return Ok(());
                }
                if msg.event_name() == Some("crash") && ctx.generation() == 1 {
                    return Err(WorkerError::Exit { code: 7 });
                }
            }
            Ok(())
        });
        let mut sup = supervisor(config(&[8001, 8002], 1, 30_000), worker);
        let mut events = sup.events();
        sup.start().unwrap();
        pump_until(&mut sup, |s| s.active == 4).await;

        sup.deliver(3, Message::event("crash"));
        let history = pump_until(&mut sup, |s| {
            s.slots[3].generation == 2 && s.active == 4
        })
        .await;

        assert!(history.contains(&3));
        assert_eq!(history.last(), Some(&4));
        assert_eq!(sup.slots[3].restarts, 1);
        assert_eq!(sup.starting(), 4);

        let mut restarts = 0;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::WorkerRestarting {
                assert_eq!(ev.slot, Some(3));
                assert_eq!(ev.code, Some(7));
                restarts += 1;
            }
        }
        assert_eq!(restarts, 1);

        sup.begin_shutdown("test");
        pump_until(&mut sup, |s| s.live() == 0).await;
    }

    #[tokio::test]
    async fn duplicate_exit_is_fatal() {
        let mut sup = supervisor(config(&[], 0, 30_000), idle_worker());
        sup.start().unwrap();
        pump_until(&mut sup, |s| s.active == 1).await;

        let err = sup.on_exit(0, 99, 0).unwrap_err();
        assert!(matches!(err, RuntimeError::AlreadyStopped { slot: 0 }));
        assert_eq!(err.to_string(), "Application server stopped");

        sup.begin_shutdown("test");
        pump_until(&mut sup, |s| s.live() == 0).await;
    }

    #[tokio::test]
    async fn exit_during_shutdown_is_not_respawned() {
        let worker = WorkerFn::arc(|mut ctx: WorkerContext| async move {
            ctx.started();
            ctx.stopped().await;
            Err::<(), _>(WorkerError::Exit { code: 3 })
        });
        let mut sup = supervisor(config(&[8001], 0, 30_000), worker);
        sup.start().unwrap();
        pump_until(&mut sup, |s| s.active == 2).await;

        sup.begin_shutdown("test");
        pump_until(&mut sup, |s| s.live() == 0).await;
        assert!(sup.slots.iter().all(|s| s.restarts == 0 && s.generation == 1));
    }

    #[tokio::test]
    async fn startup_deadline_names_pending_slots() {
        let worker = WorkerFn::arc(|mut ctx: WorkerContext| async move {
            if ctx.role() != Role::Scheduler {
                ctx.started();
            }
            ctx.stopped().await;
            Ok::<_, WorkerError>(())
        });
        let mut sup = supervisor(config(&[8001], 0, 50), worker);
        let mut events = sup.events();
        sup.start().unwrap();

        pump_until(&mut sup, |s| s.starting == 2 && s.active == 1).await;
        assert!(sup.startup.is_armed());
        pump_until(&mut sup, |s| !s.startup.is_armed()).await;

        let timeouts: Vec<Event> = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|e| e.kind == EventKind::StartupTimeout)
            .collect();
        assert_eq!(timeouts.len(), 1);
        assert_eq!(timeouts[0].reason.as_deref(), Some("1 (scheduler)"));

        sup.begin_shutdown("test");
        pump_until(&mut sup, |s| s.live() == 0).await;
    }

    #[tokio::test]
    async fn interrupt_byte_stops_every_worker() {
        let mut sup = supervisor(config(&[8001], 1, 30_000), idle_worker());
        let mut events = sup.events();
        sup.start().unwrap();
        pump_until(&mut sup, |s| s.active == 3).await;

        let input: &'static [u8] = b"\x03";
        shutdown::spawn_interrupt_watcher(input, sup.signals_tx.clone()).unwrap();
        pump_until(&mut sup, |s| s.live() == 0).await;

        let seen: Vec<Event> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        let requested: Vec<&Event> = seen
            .iter()
            .filter(|e| e.kind == EventKind::ShutdownRequested)
            .collect();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0].reason.as_deref(), Some(shutdown::INTERRUPT_REASON));

        let exits: Vec<Option<i32>> = seen
            .iter()
            .filter(|e| e.kind == EventKind::WorkerExited)
            .map(|e| e.code)
            .collect();
        assert_eq!(exits, vec![Some(0); 3]);
        assert_eq!(seen.last().map(|e| e.kind), Some(EventKind::AllStopped));
        assert!(sup.slots.iter().all(|s| s.restarts == 0));
    }

    #[tokio::test]
    async fn second_interrupt_while_stopping_aborts() {
        let stubborn = WorkerFn::arc(|mut ctx: WorkerContext| async move {
            ctx.started();
            while ctx.recv().await.is_some() {}
            Ok::<_, WorkerError>(())
        });
        let mut sup = supervisor(config(&[], 1, 30_000), stubborn);
        sup.start().unwrap();
        pump_until(&mut sup, |s| s.active == 2).await;

        assert_eq!(sup.on_interrupt("SIGINT").unwrap(), Flow::Continue);
        assert_eq!(sup.begin_shutdown("shutdown requested by handle"), Flow::Continue);

        let err = sup.on_interrupt("SIGINT").unwrap_err();
        assert!(matches!(err, RuntimeError::Interrupted { trigger: "SIGINT" }));
        assert_eq!(err.as_label(), "runtime_interrupted");
        assert_eq!(sup.live(), 2);
    }

    #[tokio::test]
    async fn failed_delivery_replies_on_the_port() {
        let mut sup = supervisor(config(&[], 0, 30_000), idle_worker());
        let (port, mut reply) = crate::messages::Port::channel();
        sup.deliver(0, Message::task_with_port(serde_json::json!(1), port));
        assert!(reply.try_recv().is_some_and(|r| r.is_error()));
    }
}
