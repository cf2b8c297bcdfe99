//! Executes one parsed pipeline sequence.
//!
//! Builtins run in-process; everything else is spawned with
//! [`std::process::Command`], with an OS pipe between each pair of adjacent
//! piped commands. The read end of the most recent pipe is a single-owner
//! value: it is either moved into exactly one child's stdin or dropped, so
//! every endpoint is closed exactly once on every path.

use crate::builtin::{self, Builtin};
use crate::command::Command;
use crate::env::Environment;
use crate::remote::RemoteClient;
use anyhow::Result;
use std::io::ErrorKind;
use std::process::{self, Child, ChildStdout, Stdio};

/// Run every command in `sequence`, in order.
///
/// A `quit` verb stops the walk after reaping everything already spawned and
/// sets `env.should_exit`. Piped commands run concurrently; each segment
/// (a maximal run of piped commands) is waited for, in spawn order, before
/// the next segment starts. Children that were spawned are reaped
/// unconditionally by the time this returns.
pub fn run_commands(
    sequence: &[Command],
    env: &mut Environment,
    remote: &mut Option<RemoteClient>,
) -> Result<()> {
    // Children spawned since the last segment boundary, in spawn order.
    let mut segment: Vec<Child> = Vec::new();
    // Read end of the most recent pipe, owned here until handed to a child.
    let mut prev_read: Option<ChildStdout> = None;

    for cmd in sequence {
        let Some(verb) = cmd.verb() else { continue };

        match Builtin::lookup(verb) {
            Some(Builtin::Quit) => {
                reap(&mut segment);
                env.should_exit = true;
                return Ok(());
            }
            Some(b) => {
                // Synchronous, no fork. A pending read end survives the
                // builtin untouched and feeds the next piped command.
                if let Err(e) = builtin::dispatch(b, cmd, env, remote) {
                    eprintln!("cloudsh: {}: {:#}", verb, e);
                }
                continue;
            }
            None => {}
        }

        let mut child_cmd = process::Command::new(&cmd.tokens[0]);
        child_cmd
            .args(&cmd.tokens[1..])
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        if cmd.pipe_in {
            child_cmd.stdin(match prev_read.take() {
                Some(read_end) => Stdio::from(read_end),
                // The predecessor failed to spawn; read end of nothing is EOF.
                None => Stdio::null(),
            });
        }
        if cmd.pipe_out {
            child_cmd.stdout(Stdio::piped());
        }

        match child_cmd.spawn() {
            Ok(mut child) => {
                if cmd.pipe_out {
                    prev_read = child.stdout.take();
                }
                segment.push(child);
                if !cmd.pipe_out {
                    // Segment boundary: wait for everything spawned since
                    // the previous boundary before moving on.
                    reap(&mut segment);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                // The Rust-visible form of an exec failure: fatal to this
                // command only. A downstream reader will see EOF.
                eprintln!("cloudsh: {}: {}", cmd.tokens[0], e);
            }
            Err(e) => {
                // Resource-acquisition failure (descriptors, process table):
                // abort the rest of the line, but never leave zombies.
                eprintln!("cloudsh: failed to spawn {}: {}", cmd.tokens[0], e);
                reap(&mut segment);
                return Ok(());
            }
        }
    }

    reap(&mut segment);
    Ok(())
}

/// Wait for every child in spawn order, draining the segment.
fn reap(segment: &mut Vec<Child>) {
    for mut child in segment.drain(..) {
        if let Err(e) = child.wait() {
            eprintln!("cloudsh: wait failed: {}", e);
        }
    }
}
