//! Async event loop.
//!
//! [`run`] owns a [`Runtime`] and feeds it input from an `mpsc` channel,
//! sleeping until the next timer deadline in between. The runtime's virtual
//! clock is advanced to real elapsed time before every input and on every
//! wake-up, so tooltip and toast delays play out in wall-clock time.
//! [`forward_terminal_input`] is the crossterm producer for that channel.

use std::io;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::event::input::{try_from_crossterm, InputEvent};
use crate::runtime::Runtime;

/// Placeholder wake-up for a disabled timer branch.
const IDLE: Duration = Duration::from_secs(3600);

/// Drive `runtime` until the input channel closes, then hand it back.
pub async fn run(mut runtime: Runtime, mut input: mpsc::Receiver<InputEvent>) -> Runtime {
    let origin = Instant::now();
    debug!("driver started");
    loop {
        catch_up(&mut runtime, origin);
        let deadline = runtime.next_timer_in().map(|d| Instant::now() + d);
        let wake = deadline.unwrap_or_else(|| Instant::now() + IDLE);
        tokio::select! {
            received = input.recv() => match received {
                Some(event) => {
                    catch_up(&mut runtime, origin);
                    trace!(?event, "input");
                    runtime.handle_input(event);
                }
                None => break,
            },
            _ = sleep_until(wake), if deadline.is_some() => {}
        }
    }
    catch_up(&mut runtime, origin);
    debug!("driver stopped: input closed");
    runtime
}

/// Advance the virtual clock to the real time elapsed since `origin`.
fn catch_up(runtime: &mut Runtime, origin: Instant) {
    let elapsed = origin.elapsed();
    let behind = elapsed.saturating_sub(runtime.timers.now());
    if !behind.is_zero() {
        runtime.advance(behind);
    }
}

/// Read terminal events on a blocking thread and forward the ones the
/// runtime understands. Ends when the receiver is dropped or reading fails.
pub fn forward_terminal_input(tx: mpsc::Sender<InputEvent>) -> JoinHandle<io::Result<()>> {
    tokio::task::spawn_blocking(move || loop {
        let event = crossterm::event::read()?;
        let Some(input) = try_from_crossterm(event) else {
            continue;
        };
        if tx.blocking_send(input).is_err() {
            return Ok(());
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
