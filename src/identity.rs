use x11rb::protocol::xproto::Window;

use crate::{Result, transport::Transport};

/// Who owns a surface: process, client leader and session role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityInfo {
    pid: Option<u32>,
    pub client_leader: Window,
    pub role: Option<String>,
}

impl IdentityInfo {
    /// The validated process id, if one has been resolved.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Resolves `_NET_WM_PID` once. The id is only trusted when
    /// WM_CLIENT_MACHINE names this host; a validated id is never re-read.
    pub fn resolve_pid<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        window: Window,
        advertised: bool,
    ) -> Result<Option<u32>> {
        if self.pid.is_some() {
            return Ok(self.pid);
        }
        if !advertised {
            return Ok(None);
        }

        let atoms = transport.atoms();
        let pid = transport
            .get_property(window, atoms._NET_WM_PID, atoms.CARDINAL, 1)?
            .and_then(|prop| prop.value32().and_then(|mut words| words.next()))
            .filter(|pid| *pid > 0 && i32::try_from(*pid).is_ok());
        let Some(pid) = pid else {
            return Ok(None);
        };

        let Some(theirs) = transport.text_property(window, atoms.WM_CLIENT_MACHINE)? else {
            tracing::debug!(window, pid, "pid advertised without WM_CLIENT_MACHINE");
            return Ok(None);
        };
        let local = transport.local_hostname()?;
        if !host_matches(&local, &theirs) {
            tracing::debug!(window, pid, %theirs, %local, "pid belongs to another host");
            return Ok(None);
        }

        self.pid = Some(pid);
        Ok(self.pid)
    }
}

/// True when `theirs` is `local` itself or `local` followed by a domain.
pub fn host_matches(local: &str, theirs: &str) -> bool {
    if local.is_empty() {
        return false;
    }
    match theirs.strip_prefix(local) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;

    const WINDOW: Window = 0x60_0001;

    #[test]
    fn host_matching() {
        assert!(host_matches("workstation", "workstation"));
        assert!(host_matches("workstation", "workstation.example.org"));
        assert!(!host_matches("workstation", "workstation2"));
        assert!(!host_matches("workstation", "other"));
        assert!(!host_matches("", "workstation"));
    }

    #[test]
    fn pid_is_validated_then_cached() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set32(WINDOW, atoms._NET_WM_PID, atoms.CARDINAL, &[4242]);
        transport.set_text(WINDOW, atoms.WM_CLIENT_MACHINE, "workstation.lan");

        let mut identity = IdentityInfo::default();
        assert_eq!(identity.resolve_pid(&transport, WINDOW, true).ok(), Some(Some(4242)));

        // Cached: later changes to the property are not re-read.
        transport.set32(WINDOW, atoms._NET_WM_PID, atoms.CARDINAL, &[7]);
        assert_eq!(identity.resolve_pid(&transport, WINDOW, true).ok(), Some(Some(4242)));
        assert_eq!(identity.pid(), Some(4242));
    }

    #[test]
    fn foreign_host_pid_is_rejected() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set32(WINDOW, atoms._NET_WM_PID, atoms.CARDINAL, &[4242]);
        transport.set_text(WINDOW, atoms.WM_CLIENT_MACHINE, "elsewhere");

        let mut identity = IdentityInfo::default();
        assert_eq!(identity.resolve_pid(&transport, WINDOW, true).ok(), Some(None));
        assert_eq!(identity.pid(), None);
    }

    #[test]
    fn unadvertised_pid_is_not_fetched() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set32(WINDOW, atoms._NET_WM_PID, atoms.CARDINAL, &[4242]);
        transport.set_text(WINDOW, atoms.WM_CLIENT_MACHINE, "workstation");

        let mut identity = IdentityInfo::default();
        assert_eq!(identity.resolve_pid(&transport, WINDOW, false).ok(), Some(None));
    }
}
