//! Demo worker set run by the `appvisor` binary.
//!
//! - balancer / servers: report started, idle until `stop`
//! - scheduler: acknowledges every task on its port
//! - pool workers: echo invoke payloads, then report `done`

use serde_json::json;
use tracing::{debug, info};

use appvisor::{InvokeName, Message, Role, WorkerContext, WorkerError, WorkerFn, WorkerRef};

pub fn worker() -> WorkerRef {
    WorkerFn::arc(|ctx: WorkerContext| async move {
        match ctx.role() {
            Role::Balancer | Role::Server => serve(ctx).await,
            Role::Scheduler => schedule(ctx).await,
            Role::PoolWorker => execute(ctx).await,
        }
    })
}

async fn serve(mut ctx: WorkerContext) -> Result<(), WorkerError> {
    info!(slot = ctx.id(), role = %ctx.role(), port = ?ctx.port(), "front-end ready");
    ctx.started();
    ctx.stopped().await;
    Ok(())
}

async fn schedule(mut ctx: WorkerContext) -> Result<(), WorkerError> {
    ctx.started();
    while let Some(message) = ctx.recv().await {
        match message {
            Message::Task { payload, port } => {
                debug!(slot = ctx.id(), %payload, "task received");
                if let Some(port) = port {
                    port.reply(json!({ "scheduled": payload }));
                }
            }
            msg if msg.is_stop() => break,
            _ => {}
        }
    }
    Ok(())
}

async fn execute(mut ctx: WorkerContext) -> Result<(), WorkerError> {
    ctx.started();
    while let Some(message) = ctx.recv().await {
        match message {
            Message::Invoke {
                name: InvokeName::Request,
                payload,
                port,
                exclusive,
            } => {
                port.reply(payload);
                ctx.send(Message::done(port, exclusive));
            }
            msg if msg.is_stop() => break,
            _ => {}
        }
    }
    Ok(())
}
