use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};

use appvisor::{
    Config, Event, EventKind, InvokeName, Message, Reply, Role, ServerConfig, SupervisorBuilder,
    TimeoutsConfig, WorkerContext, WorkerError, WorkerFn, WorkerRef, WorkersConfig,
};

fn config(ports: &[u16], pool: usize, wait_ms: Option<u64>, start_ms: u64) -> Config {
    Config::new(ServerConfig {
        balancer: false,
        ports: ports.to_vec(),
        workers: WorkersConfig {
            pool,
            wait: wait_ms,
        },
        timeouts: TimeoutsConfig { start: start_ms },
    })
}

/// Receives events until one of `kind` shows up; returns everything seen.
async fn wait_for(events: &mut broadcast::Receiver<Event>, kind: EventKind) -> Vec<Event> {
    let mut seen = Vec::new();
    loop {
        let ev = tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .unwrap_or_else(|_| panic!("no {kind:?} within 10s, saw {seen:?}"))
            .expect("event bus closed");
        let hit = ev.kind == kind;
        seen.push(ev);
        if hit {
            return seen;
        }
    }
}

fn drain(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

/// Pool workers echo invoke payloads; `done` only when `send_done`.
async fn pool_worker(mut ctx: WorkerContext, send_done: bool) -> Result<(), WorkerError> {
    ctx.started();
    while let Some(msg) = ctx.recv().await {
        match msg {
            Message::Invoke {
                name: InvokeName::Request,
                payload,
                port,
                exclusive,
            } => {
                port.reply(payload);
                if send_done {
                    ctx.send(Message::done(port, exclusive));
                }
            }
            m if m.is_stop() => break,
            _ => {}
        }
    }
    Ok(())
}

async fn scheduler(mut ctx: WorkerContext) -> Result<(), WorkerError> {
    ctx.started();
    while let Some(msg) = ctx.recv().await {
        match msg {
            Message::Task { payload, port } => {
                if let Some(port) = port {
                    port.reply(json!({ "scheduled": payload }));
                }
            }
            m if m.is_stop() => break,
            _ => {}
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_lifecycle_stops_every_worker() {
    let stops = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&stops);
    let worker: WorkerRef = WorkerFn::arc(move |mut ctx: WorkerContext| {
        let counter = Arc::clone(&counter);
        async move {
            ctx.started();
            ctx.stopped().await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, WorkerError>(())
        }
    });

    let sup = SupervisorBuilder::new(config(&[8001, 8002], 1, None, 30_000), worker).build();
    assert_eq!(sup.count(), 4);
    assert_eq!(sup.scheduler_id(), 2);
    assert_eq!(sup.population().slot(3).map(|s| s.role), Some(Role::PoolWorker));

    let mut events = sup.events();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let seen = wait_for(&mut events, EventKind::AllStarted).await;
    let spawned: Vec<usize> = seen
        .iter()
        .filter(|e| e.kind == EventKind::WorkerSpawned)
        .filter_map(|e| e.slot)
        .collect();
    assert_eq!(spawned, vec![0, 1, 2, 3]);

    assert!(handle.shutdown());
    assert!(handle.shutdown());
    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("supervisor did not stop")
        .expect("supervisor task panicked")
        .expect("supervisor failed");

    assert_eq!(stops.load(Ordering::SeqCst), 4);
    let rest = drain(&mut events);
    let requested = rest
        .iter()
        .filter(|e| e.kind == EventKind::ShutdownRequested)
        .count();
    assert_eq!(requested, 1);
    let exits: Vec<i32> = rest
        .iter()
        .filter(|e| e.kind == EventKind::WorkerExited)
        .filter_map(|e| e.code)
        .collect();
    assert_eq!(exits, vec![0, 0, 0, 0]);
    assert_eq!(rest.last().map(|e| e.kind), Some(EventKind::AllStopped));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_timeout_warns_once() {
    let worker: WorkerRef = WorkerFn::arc(|mut ctx: WorkerContext| async move {
        if ctx.role() != Role::Scheduler {
            ctx.started();
        }
        ctx.stopped().await;
        Ok::<_, WorkerError>(())
    });
    let sup = SupervisorBuilder::new(config(&[8001], 1, None, 100), worker).build();
    let mut events = sup.events();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let seen = wait_for(&mut events, EventKind::StartupTimeout).await;
    let timeout = seen.last().cloned().expect("timeout event");
    assert_eq!(timeout.active, Some(2));
    assert_eq!(timeout.reason.as_deref(), Some("1 (scheduler)"));

    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.shutdown();
    run.await.unwrap().unwrap();

    let more = drain(&mut events)
        .into_iter()
        .filter(|e| e.kind == EventKind::StartupTimeout)
        .count();
    assert_eq!(more, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn no_startup_warning_when_all_start() {
    let worker: WorkerRef = WorkerFn::arc(|mut ctx: WorkerContext| async move {
        ctx.started();
        ctx.stopped().await;
        Ok::<_, WorkerError>(())
    });
    let sup = SupervisorBuilder::new(config(&[8001], 1, None, 100), worker).build();
    let mut events = sup.events();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let mut seen = wait_for(&mut events, EventKind::AllStarted).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.shutdown();
    run.await.unwrap().unwrap();

    seen.extend(drain(&mut events));
    assert!(seen.iter().all(|e| e.kind != EventKind::StartupTimeout));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crashed_worker_is_respawned_in_place() {
    let worker: WorkerRef = WorkerFn::arc(|ctx: WorkerContext| async move {
        if ctx.role() == Role::PoolWorker && ctx.generation() == 1 {
            ctx.started();
            return Err(WorkerError::Exit { code: 7 });
        }
        let mut ctx = ctx;
        ctx.started();
        ctx.stopped().await;
        Ok(())
    });
    let sup = SupervisorBuilder::new(config(&[8001, 8002], 1, None, 30_000), worker).build();
    let mut events = sup.events();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let mut seen = wait_for(&mut events, EventKind::WorkerRestarting).await;
    let restart = seen.last().cloned().expect("restart event");
    assert_eq!(restart.slot, Some(3));
    assert_eq!(restart.code, Some(7));
    assert_eq!(restart.generation, Some(2));

    loop {
        let more = wait_for(&mut events, EventKind::WorkerStarted).await;
        let done = more
            .last()
            .is_some_and(|e| e.slot == Some(3) && e.generation == Some(2));
        seen.extend(more);
        if done {
            break;
        }
    }
    handle.shutdown();
    run.await.unwrap().unwrap();
    seen.extend(drain(&mut events));

    let restarts = seen
        .iter()
        .filter(|e| e.kind == EventKind::WorkerRestarting)
        .count();
    assert_eq!(restarts, 1);
    let crash = seen
        .iter()
        .find(|e| e.kind == EventKind::WorkerExited && e.code == Some(7))
        .expect("crash exit event");
    assert_eq!(crash.slot, Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exclusive_request_without_free_worker_times_out() {
    let (tx, mut rx) = mpsc::unbounded_channel::<(&'static str, Reply)>();
    let worker: WorkerRef = WorkerFn::arc(move |mut ctx: WorkerContext| {
        let tx = tx.clone();
        async move {
            match ctx.role() {
                Role::PoolWorker => return pool_worker(ctx, false).await,
                Role::Scheduler => return scheduler(ctx).await,
                _ => {}
            }
            ctx.started();

            let mut first = ctx.invoke(json!("a"), true).expect("supervisor alive");
            if let Some(reply) = first.recv().await {
                let _ = tx.send(("first", reply));
            }
            // The only pool worker never sends `done`, so it stays captured.
            let mut second = ctx.invoke(json!("b"), true).expect("supervisor alive");
            if let Some(reply) = second.recv().await {
                let _ = tx.send(("second", reply));
            }
            let mut shared = ctx.invoke(json!("c"), false).expect("supervisor alive");
            if let Some(reply) = shared.recv().await {
                let _ = tx.send(("shared", reply));
            }

            ctx.stopped().await;
            Ok::<_, WorkerError>(())
        }
    });

    let sup = SupervisorBuilder::new(config(&[8001], 1, Some(100), 30_000), worker).build();
    let mut events = sup.events();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let no_thread = Reply::Error {
        error: "No thread available".into(),
    };
    let mut replies = Vec::new();
    for _ in 0..3 {
        let reply = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("reply in time")
            .expect("reply channel open");
        replies.push(reply);
    }
    assert_eq!(
        replies,
        vec![
            ("first", Reply::Data(json!("a"))),
            ("second", no_thread.clone()),
            ("shared", no_thread),
        ]
    );
    assert_eq!(
        serde_json::to_value(&replies[1].1).unwrap(),
        json!({ "error": "No thread available" })
    );

    let seen = wait_for(&mut events, EventKind::CaptureTimedOut).await;
    assert_eq!(seen.last().and_then(|e| e.slot), Some(0));

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn done_releases_the_pool_worker_and_tasks_reach_the_scheduler() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Reply>();
    let worker: WorkerRef = WorkerFn::arc(move |mut ctx: WorkerContext| {
        let tx = tx.clone();
        async move {
            match ctx.role() {
                Role::PoolWorker => return pool_worker(ctx, true).await,
                Role::Scheduler => return scheduler(ctx).await,
                _ => {}
            }
            ctx.started();

            for payload in [json!(1), json!(2)] {
                let mut port = ctx.invoke(payload, true).expect("supervisor alive");
                if let Some(reply) = port.recv().await {
                    let _ = tx.send(reply);
                }
            }
            let mut task = ctx.task(json!({"job": "report"})).expect("supervisor alive");
            if let Some(reply) = task.recv().await {
                let _ = tx.send(reply);
            }

            ctx.stopped().await;
            Ok::<_, WorkerError>(())
        }
    });

    let sup = SupervisorBuilder::new(config(&[8001], 1, Some(2_000), 30_000), worker).build();
    let handle = sup.handle();
    let run = tokio::spawn(sup.run());

    let mut replies = Vec::new();
    for _ in 0..3 {
        let reply = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("reply in time")
            .expect("reply channel open");
        replies.push(reply);
    }
    assert_eq!(
        replies,
        vec![
            Reply::Data(json!(1)),
            Reply::Data(json!(2)),
            Reply::Data(json!({ "scheduled": { "job": "report" } })),
        ]
    );

    handle.shutdown();
    run.await.unwrap().unwrap();
}
