//! Daemon module for the pomodoro clock.
//!
//! This module contains the core daemon functionality:
//! - `timer`: the phase controller and its state transitions
//! - `ipc`: Unix socket server and request dispatch
//! - `clock`, `trigger`, `status`: time source, tick arming and status text
//!
//! [`run`] wires the real collaborators together and drives the controller
//! from a single-threaded event loop.

pub mod clock;
pub mod ipc;
pub mod status;
pub mod timer;
pub mod trigger;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ConfigFile, ConfigSource};
use crate::dispatch::Dispatcher;
use crate::hooks::{command_observer, HookCommand};
use crate::notification::DesktopNotifier;
use crate::process::{DetachedLauncher, Launcher, SequentialLauncher};
use crate::sound::{try_create_player, PlaybackEnv, SoundPlayer};
use crate::tracking::CommandTracker;
use crate::types::{IpcRequest, IpcResponse};

pub use clock::{Clock, ManualClock, SystemClock};
pub use ipc::{handle_request, snapshot, IpcError, IpcServer};
pub use timer::{Answers, Collaborators, Confirm, InvokeOutcome, PhaseController, Prompt, TimerError};
pub use trigger::TickTrigger;

/// Tick period of the armed trigger.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Capacity of the request queue between connections and the controller.
const REQUEST_QUEUE: usize = 16;

/// Where the daemon listens and what it reads.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub socket_path: PathBuf,
    pub config_path: PathBuf,
}

/// A decoded request waiting for the controller.
struct PendingRequest {
    request: IpcRequest,
    reply: oneshot::Sender<IpcResponse>,
}

/// Runs the daemon until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, another controller is
/// alive in this process, or the socket cannot be bound.
pub async fn run(options: DaemonOptions) -> Result<()> {
    let launcher: Arc<dyn Launcher> = Arc::new(DetachedLauncher);
    let config_file = ConfigFile::new(&options.config_path);
    let config = config_file
        .load()
        .with_context(|| format!("Failed to load {:?}", options.config_path))?;

    let player = try_create_player().map(|player| Box::new(player) as Box<dyn SoundPlayer>);
    if player.is_none() {
        info!("No audio output device; falling back to host players");
    }

    let dispatcher = Dispatcher::new(
        Box::new(DesktopNotifier::detect(Arc::clone(&launcher))),
        player,
        Arc::clone(&launcher),
        PlaybackEnv::detect(),
    );

    // Clock-outs must finish before the next clock-in starts.
    let tracking_launcher: Arc<dyn Launcher> = Arc::new(
        SequentialLauncher::new("tracking-commands")
            .context("Failed to start the tracking command worker")?,
    );

    let mut controller = PhaseController::new(Collaborators {
        config: Box::new(config_file),
        clock: Box::new(SystemClock),
        tracker: Box::new(CommandTracker::new(
            config.tracking.clone(),
            tracking_launcher,
        )),
        dispatcher,
    })?;
    register_hook_commands(&mut controller, &config.hooks, &launcher);

    let server = IpcServer::new(&options.socket_path)?;
    info!("Listening on {:?}", server.socket_path());

    serve_until(&mut controller, server, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Registers one shell observer per configured hook.
pub fn register_hook_commands(
    controller: &mut PhaseController,
    hooks: &[HookCommand],
    launcher: &Arc<dyn Launcher>,
) {
    for hook in hooks {
        controller.hooks_mut().register(
            hook.on,
            command_observer(hook.command.clone(), Arc::clone(launcher)),
        );
    }
}

/// Serves IPC requests and drives ticks until `shutdown` completes.
///
/// Requests and ticks are handled one at a time on the calling task, so the
/// controller is never touched concurrently.
///
/// # Errors
///
/// Currently infallible; per-connection failures are logged.
pub async fn serve_until<F>(
    controller: &mut PhaseController,
    server: IpcServer,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::channel::<PendingRequest>(REQUEST_QUEUE);
    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut generation = controller.trigger().generation();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if controller.trigger().is_armed() {
                    if let Err(e) = controller.tick() {
                        warn!("Tick failed: {}", e);
                    }
                }
            }
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    tokio::spawn(forward_connection(stream, tx.clone()));
                }
                Err(e) => warn!("{:#}", e),
            },
            Some(pending) = rx.recv() => {
                let response = handle_request(controller, pending.request);
                if pending.reply.send(response).is_err() {
                    debug!("Client went away before the response");
                }
            }
            () = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }

        // Realign the 1 Hz grid to the start of a newly armed phase.
        let current = controller.trigger().generation();
        if current != generation {
            generation = current;
            ticker.reset();
        }
    }

    Ok(())
}

/// Reads one request from `stream`, hands it to the controller loop and
/// writes back the reply.
async fn forward_connection(mut stream: UnixStream, tx: mpsc::Sender<PendingRequest>) {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => {
            let (reply, response) = oneshot::channel();
            if tx.send(PendingRequest { request, reply }).await.is_err() {
                IpcResponse::error("Daemon is shutting down")
            } else {
                response
                    .await
                    .unwrap_or_else(|_| IpcResponse::error("Daemon is shutting down"))
            }
        }
        Err(e) => {
            warn!("Rejected request: {:#}", e);
            IpcResponse::error(format!("Invalid request: {:#}", e))
        }
    };

    if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
        debug!("Failed to send response: {:#}", e);
    }
}
