//! `_NET_WM_PING` probing and the kill fallback for unresponsive clients.

use std::{io, time::Duration};

use x11rb::protocol::xproto::{Timestamp, Window};

use crate::{ClientError, Result, transport::ProbeTimer, transport::Transport};

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(3000);

/// Upper bound on transient-owner hops during escalation.
const MAX_OWNER_DEPTH: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProbeState {
    #[default]
    Idle,
    ProbeSent {
        timestamp: Timestamp,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KillSignal {
    #[default]
    Term,
    Kill,
    Int,
    Hup,
}

impl KillSignal {
    pub fn parse(value: &str) -> Option<Self> {
        let name = value.trim().to_ascii_uppercase();
        match name.strip_prefix("SIG").unwrap_or(&name) {
            "TERM" => Some(KillSignal::Term),
            "KILL" => Some(KillSignal::Kill),
            "INT" => Some(KillSignal::Int),
            "HUP" => Some(KillSignal::Hup),
            _ => None,
        }
    }

    pub fn as_raw(self) -> libc::c_int {
        match self {
            KillSignal::Term => libc::SIGTERM,
            KillSignal::Kill => libc::SIGKILL,
            KillSignal::Int => libc::SIGINT,
            KillSignal::Hup => libc::SIGHUP,
        }
    }
}

/// Lookup of surfaces related to the one being escalated.
pub trait OwnerChain {
    /// Validated process id of `window`, if any.
    fn resolve_pid(&mut self, window: Window) -> Option<u32>;

    /// The surface `window` is transient for.
    fn owner_of(&self, window: Window) -> Option<Window>;
}

pub trait ProcessControl {
    fn terminate(&mut self, pid: u32) -> Result<()>;
}

/// Sends a real signal with `kill(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalSender {
    pub signal: KillSignal,
}

impl ProcessControl for SignalSender {
    fn terminate(&mut self, pid: u32) -> Result<()> {
        let pid = libc::pid_t::try_from(pid)
            .ok()
            .filter(|pid| *pid > 0)
            .ok_or_else(|| ClientError::Process(format!("refusing to signal pid {pid}")))?;
        // SAFETY: kill has no memory-safety preconditions; pid is a positive
        // process id so process groups are never targeted.
        let rc = unsafe { libc::kill(pid, self.signal.as_raw()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(ClientError::Process(format!(
                "kill({pid}, {:?}) failed: {}",
                self.signal,
                io::Error::last_os_error()
            )))
        }
    }
}

/// Result of a timed-out probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Escalation {
    /// The timer fired after the probe was already answered.
    Stale,
    Signalled { window: Window, pid: u32 },
    /// No surface in the owner chain had a usable process id.
    Unresolved,
}

#[derive(Debug)]
pub struct LivenessMonitor {
    state: ProbeState,
    timeout: Duration,
}

impl LivenessMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ProbeState::Idle,
            timeout,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ProbeState::ProbeSent { .. })
    }

    /// Sends one probe. Returns false when the client does not speak
    /// `_NET_WM_PING`, a probe is already outstanding, or no server
    /// timestamp is known yet. A zero timestamp could never be matched by
    /// a reply.
    pub fn send_probe<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        timer: &mut dyn ProbeTimer,
        window: Window,
        supports_ping: bool,
    ) -> Result<bool> {
        if !supports_ping || self.is_pending() {
            return Ok(false);
        }

        let atoms = transport.atoms();
        let timestamp = transport.event_time();
        if timestamp == x11rb::CURRENT_TIME {
            tracing::warn!(window, "no server timestamp; ping not sent");
            return Ok(false);
        }
        transport.send_client_message(
            window,
            atoms.WM_PROTOCOLS,
            [atoms._NET_WM_PING, timestamp, window, 0, 0],
        )?;
        timer.arm(window, self.timeout)?;
        self.state = ProbeState::ProbeSent { timestamp };
        tracing::debug!(window, timestamp, "ping sent");
        Ok(true)
    }

    /// Accepts a reply only when it echoes the outstanding probe exactly.
    pub fn on_reply(
        &mut self,
        ping_atom: u32,
        window: Window,
        data: [u32; 5],
        timer: &mut dyn ProbeTimer,
    ) -> bool {
        let ProbeState::ProbeSent { timestamp } = self.state else {
            return false;
        };
        let matches = data[0] == ping_atom
            && data[1] == timestamp
            && data[2] == window
            && data[0] != 0
            && data[1] != 0
            && data[2] != 0;
        if !matches {
            tracing::debug!(window, ?data, expected = timestamp, "ignoring stale ping reply");
            return false;
        }
        timer.cancel(window);
        self.state = ProbeState::Idle;
        tracing::debug!(window, timestamp, "ping answered");
        true
    }

    /// Handles probe expiry. Tries the surface's own process first, then
    /// each transient owner in turn. Always ends Idle.
    pub fn on_timeout(
        &mut self,
        window: Window,
        chain: &mut dyn OwnerChain,
        process: &mut dyn ProcessControl,
    ) -> Escalation {
        if !self.is_pending() {
            return Escalation::Stale;
        }
        self.state = ProbeState::Idle;
        tracing::info!(window, "client did not answer ping");

        let mut visited = Vec::new();
        let mut current = Some(window);
        while let Some(candidate) = current {
            if visited.contains(&candidate) || visited.len() >= MAX_OWNER_DEPTH {
                break;
            }
            visited.push(candidate);

            if let Some(pid) = chain.resolve_pid(candidate) {
                match process.terminate(pid) {
                    Ok(()) => {
                        tracing::info!(window = candidate, pid, "signalled unresponsive client");
                        return Escalation::Signalled {
                            window: candidate,
                            pid,
                        };
                    }
                    Err(err) => tracing::warn!(window = candidate, pid, "{err}"),
                }
            }
            current = chain.owner_of(candidate);
        }

        tracing::warn!(window, "no process to signal for unresponsive client");
        Escalation::Unresolved
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PING_TIMEOUT)
    }
}
