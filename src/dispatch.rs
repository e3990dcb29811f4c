//! Routes PropertyNotify and ClientMessage events to the adapter and frame.

use smithay::utils::{Logical, Point, Rectangle, Size};
use x11rb::protocol::xproto::Atom;

use crate::{
    client::FrameClient,
    ewmh::{Layer, TrayOption, WindowState, Workspace},
    frame::{ConfigureRequest, FrameAction, FrameControl, FrameNotification, StackMode},
    hints::Gravity,
    icccm::FrameState,
    property::PropertyKind,
    reconcile::{self, FrameCommand, StateAction, StateRequest},
    transport::{ProbeTimer, Transport},
};

/// An inbound event addressed to one client window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    PropertyChanged {
        atom: Atom,
        deleted: bool,
    },
    Message {
        message_type: Atom,
        format: u8,
        data: [u32; 5],
    },
}

/// What became of an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// A `_NET_WM_STATE` request, with the commands it produced.
    Reconciled(Vec<FrameCommand>),
    /// Not ours; the caller's default handler should see it.
    Forwarded,
}

pub struct Dispatcher<'a> {
    pub transport: &'a dyn Transport,
    pub client: &'a mut FrameClient,
    /// `None` while the client has no frame yet.
    pub frame: Option<&'a mut dyn FrameControl>,
    pub timer: &'a mut dyn ProbeTimer,
}

impl Dispatcher<'_> {
    pub fn dispatch(&mut self, event: ClientEvent) -> Dispatch {
        match event {
            ClientEvent::PropertyChanged { atom, deleted } => self.property_changed(atom, deleted),
            ClientEvent::Message {
                message_type,
                format,
                data,
            } => self.client_message(message_type, format, data),
        }
    }

    fn notify(&mut self, notification: FrameNotification) {
        if let Some(frame) = self.frame.as_deref_mut() {
            frame.notify(notification);
        }
    }

    /// Updates the presence flag, then re-derives the value whether the
    /// property appeared, changed or went away.
    pub fn property_changed(&mut self, atom: Atom, deleted: bool) -> Dispatch {
        let Some(kind) = PropertyKind::from_atom(self.transport.atoms(), atom) else {
            return Dispatch::Forwarded;
        };
        let window = self.client.window();
        self.client.cache_mut().set(kind, !deleted);
        tracing::trace!(window, ?kind, deleted, "property changed");

        let transport = self.transport;
        match kind {
            PropertyKind::WmName | PropertyKind::NetWmName => {
                if self.client.refresh_title(transport) {
                    let title = self.client.window_title().map(str::to_owned);
                    self.notify(FrameNotification::TitleChanged(title));
                }
            }
            PropertyKind::WmIconName | PropertyKind::NetWmIconName => {
                if self.client.refresh_icon_title(transport) {
                    let title = self.client.icon_title().map(str::to_owned);
                    self.notify(FrameNotification::IconTitleChanged(title));
                }
            }
            PropertyKind::WmClass => {
                if self.client.read_class_hint(transport) {
                    self.notify(FrameNotification::ClassChanged);
                }
            }
            PropertyKind::WmHints => {
                let before = self.client.wm_hints().copied().unwrap_or_default();
                let was_urgent = self.client.urgency_hint();
                self.client.read_wm_hints(transport);
                let after = self.client.wm_hints().copied().unwrap_or_default();
                let urgent = self.client.urgency_hint();
                if urgent != was_urgent {
                    self.notify(FrameNotification::UrgencyHintChanged(urgent));
                }
                let icon_moved = (before.icon_pixmap(), before.icon_mask())
                    != (after.icon_pixmap(), after.icon_mask());
                if icon_moved && !self.has_any_icon_property() {
                    self.notify(FrameNotification::IconChanged);
                }
            }
            PropertyKind::WmNormalHints => {
                if self.client.read_size_hints(transport) {
                    self.notify(FrameNotification::SizeHintsChanged);
                }
            }
            PropertyKind::WmTransientFor => {
                if let Some(old) = self.client.read_transient(transport) {
                    let new = self.client.transient_for().unwrap_or(0);
                    self.notify(FrameNotification::TransientChanged { old, new });
                }
            }
            PropertyKind::WmProtocols => self.client.read_protocols(transport),
            PropertyKind::WmClientLeader => self.client.read_client_leader(transport),
            PropertyKind::WmWindowRole | PropertyKind::WindowRole => {
                self.client.read_window_role(transport)
            }
            PropertyKind::MwmHints => {
                self.client.read_motif_hints(transport);
                self.notify(FrameNotification::MotifHintsChanged);
            }
            PropertyKind::NetWmIcon => self.notify(FrameNotification::IconChanged),
            PropertyKind::WinIcons => {
                if !self.client.has(PropertyKind::NetWmIcon) {
                    self.notify(FrameNotification::IconChanged);
                }
            }
            PropertyKind::KwmWinIcon => {
                if !self.client.has(PropertyKind::NetWmIcon)
                    && !self.client.has(PropertyKind::WinIcons)
                {
                    self.notify(FrameNotification::IconChanged);
                }
            }
            PropertyKind::NetWmStrut | PropertyKind::NetWmStrutPartial => {
                let strut = self.client.effective_strut(transport);
                self.notify(FrameNotification::StrutChanged(strut));
            }
            PropertyKind::NetWmUserTime => {
                if let Some(time) = self.client.user_time(transport) {
                    self.notify(FrameNotification::UserTimeChanged(time));
                }
            }
            PropertyKind::NetWmUserTimeWindow => {
                let window = self.client.user_time_window(transport).unwrap_or(0);
                self.notify(FrameNotification::UserTimeWindowChanged(window));
            }
            PropertyKind::NetWmWindowOpacity => {
                let opacity = self.client.opacity(transport);
                self.notify(FrameNotification::OpacityChanged(opacity));
            }
            // Presence only; values are read on demand.
            PropertyKind::WmState
            | PropertyKind::SmClientId
            | PropertyKind::KdeNetWmSystemTrayWindowFor
            | PropertyKind::NetWmDesktop
            | PropertyKind::NetWmPid
            | PropertyKind::NetWmState
            | PropertyKind::NetWmWindowType
            | PropertyKind::NetStartupId
            | PropertyKind::WinTray
            | PropertyKind::WinLayer
            | PropertyKind::XembedInfo => {}
        }
        Dispatch::Handled
    }

    fn has_any_icon_property(&self) -> bool {
        [
            PropertyKind::NetWmIcon,
            PropertyKind::WinIcons,
            PropertyKind::KwmWinIcon,
        ]
        .into_iter()
        .any(|kind| self.client.has(kind))
    }

    pub fn client_message(&mut self, message_type: Atom, format: u8, data: [u32; 5]) -> Dispatch {
        let atoms = *self.transport.atoms();
        let window = self.client.window();
        tracing::trace!(
            window,
            message = atoms.name_of(message_type).unwrap_or("unknown"),
            ?data,
            "client message"
        );

        if message_type == atoms.WM_PROTOCOLS {
            if data[0] != atoms._NET_WM_PING {
                return Dispatch::Forwarded;
            }
            self.client.receive_ping(self.transport, data, self.timer);
            return Dispatch::Handled;
        }
        if message_type == atoms._NET_WM_DESKTOP {
            return self.desktop_request(data[0]);
        }
        if message_type == atoms._WIN_LAYER {
            return self.layer_request(data[0]);
        }
        if message_type == atoms._WIN_TRAY {
            return self.tray_request(data[0]);
        }
        if message_type == atoms._NET_WM_STATE {
            return self.state_request(data);
        }

        let ignore_activation = self.client.settings().ignore_activation_messages;
        let gravity = self.client.size_hints().gravity;
        let Some(frame) = self.frame.as_deref_mut() else {
            tracing::debug!(window, "client message before the frame exists");
            return Dispatch::Forwarded;
        };

        if message_type == atoms.WM_CHANGE_STATE {
            change_state(frame, data[0]);
        } else if message_type == atoms._NET_ACTIVE_WINDOW {
            if ignore_activation {
                tracing::debug!(window, "ignoring activation request");
            } else {
                frame.perform(FrameAction::Activate);
                frame.perform(FrameAction::Raise);
            }
        } else if message_type == atoms._NET_CLOSE_WINDOW {
            frame.perform(FrameAction::Close);
        } else if message_type == atoms._NET_RESTACK_WINDOW {
            match StackMode::from_raw(data[2]) {
                Some(mode) if format == 32 => frame.restack(data[1], mode),
                _ => tracing::debug!(window, format, detail = data[2], "bad restack request"),
            }
        } else if message_type == atoms._NET_WM_MOVERESIZE {
            if format == 32 {
                frame.start_move_size(data[0] as i32, data[1] as i32, data[2]);
            }
        } else if message_type == atoms._NET_MOVERESIZE_WINDOW {
            frame.configure_client(move_resize_request(data, gravity));
        } else if message_type == atoms._NET_WM_FULLSCREEN_MONITORS {
            let monitors = [data[0], data[1], data[2], data[3]];
            frame.update_fullscreen_monitors(monitors);
            if let Err(err) = self.client.set_fullscreen_monitors(self.transport, monitors) {
                tracing::warn!(window, "failed to write fullscreen monitors: {err}");
            }
        } else {
            return Dispatch::Forwarded;
        }
        Dispatch::Handled
    }

    fn state_request(&mut self, data: [u32; 5]) -> Dispatch {
        let window = self.client.window();
        let Some(frame) = self.frame.as_deref_mut() else {
            return Dispatch::Forwarded;
        };
        let Some(action) = StateAction::from_raw(data[0]) else {
            tracing::debug!(window, action = data[0], "unknown _NET_WM_STATE action");
            return Dispatch::Handled;
        };
        let atoms = self.transport.atoms();
        let mask = (WindowState::from_atom(atoms, data[1]) | WindowState::from_atom(atoms, data[2]))
            - WindowState::FOCUSED;
        if mask.is_empty() {
            return Dispatch::Handled;
        }
        let commands = reconcile::reconcile(frame, StateRequest { action, mask });
        tracing::debug!(window, ?action, ?mask, ?commands, "state request reconciled");
        Dispatch::Reconciled(commands)
    }

    fn desktop_request(&mut self, raw: u32) -> Dispatch {
        let window = self.client.window();
        let count = self.client.settings().workspace_count;
        let Some(workspace) = Workspace::from_raw(raw, count) else {
            tracing::debug!(window, raw, "desktop request out of range");
            return Dispatch::Handled;
        };
        match self.frame.as_deref_mut() {
            Some(frame) => frame.set_workspace(workspace.to_raw()),
            None => {
                if let Err(err) = self.client.set_workspace_hint(self.transport, workspace.to_raw()) {
                    tracing::warn!(window, "failed to write desktop hint: {err}");
                }
            }
        }
        Dispatch::Handled
    }

    fn layer_request(&mut self, raw: u32) -> Dispatch {
        let window = self.client.window();
        let Some(layer) = Layer::new(raw) else {
            tracing::debug!(window, raw, "layer request out of range");
            return Dispatch::Handled;
        };
        match self.frame.as_deref_mut() {
            Some(frame) => frame.perform(FrameAction::SetLayer(layer)),
            None => {
                if let Err(err) = self.client.set_layer_hint(self.transport, layer) {
                    tracing::warn!(window, "failed to write layer hint: {err}");
                }
            }
        }
        Dispatch::Handled
    }

    fn tray_request(&mut self, raw: u32) -> Dispatch {
        let window = self.client.window();
        let Some(option) = TrayOption::from_raw(raw) else {
            tracing::debug!(window, raw, "tray request out of range");
            return Dispatch::Handled;
        };
        match self.frame.as_deref_mut() {
            Some(frame) => frame.set_tray_option(option),
            None => {
                if let Err(err) = self.client.set_tray_hint(self.transport, option) {
                    tracing::warn!(window, "failed to write tray hint: {err}");
                }
            }
        }
        Dispatch::Handled
    }
}

fn change_state(frame: &mut dyn FrameControl, requested: u32) {
    let state = frame.state();
    match FrameState::from_raw(requested) {
        Some(FrameState::Iconic) => {
            if !state.intersects(WindowState::MINIMIZED | WindowState::ROLLED_UP) {
                frame.perform(FrameAction::Minimize);
            }
        }
        Some(FrameState::Normal) => {
            if frame.is_unmapped() {
                frame.perform(FrameAction::Restore);
            }
        }
        Some(FrameState::Withdrawn) => {
            if !state.contains(WindowState::HIDDEN) {
                frame.perform(FrameAction::Hide);
            }
        }
        None => tracing::debug!(requested, "unknown WM_CHANGE_STATE value"),
    }
}

/// Decodes `_NET_MOVERESIZE_WINDOW`: gravity in the low byte (0 keeps the
/// client's own), the x/y/width/height selector in bits 8..12.
fn move_resize_request(data: [u32; 5], client_gravity: Gravity) -> ConfigureRequest {
    let gravity = match data[0] & 0xff {
        0 => client_gravity,
        raw => Gravity::from_raw(i64::from(raw)),
    };
    let value_mask = ((data[0] >> 8) & 0xf) as u8;
    ConfigureRequest {
        value_mask,
        geometry: Rectangle {
            loc: Point::<i32, Logical>::from((data[1] as i32, data[2] as i32)),
            size: Size::from((data[3] as i32, data[4] as i32)),
        },
        gravity,
    }
}

#[cfg(test)]
mod tests {
    use x11rb::protocol::xproto::Window;

    use super::*;
    use crate::{
        client::ClientSettings,
        frame::SimulatedFrame,
        transport::fake::{FakeTimer, FakeTransport},
    };

    const WINDOW: Window = 0x30_0001;

    struct Harness {
        transport: FakeTransport,
        client: FrameClient,
        frame: SimulatedFrame,
        timer: FakeTimer,
    }

    impl Harness {
        fn new(transport: FakeTransport) -> Self {
            Self::with_settings(transport, ClientSettings::default())
        }

        fn with_settings(transport: FakeTransport, settings: ClientSettings) -> Self {
            let client = FrameClient::adopt(&transport, WINDOW, settings)
                .unwrap_or_else(|err| panic!("adopt failed: {err}"));
            Self {
                transport,
                client,
                frame: SimulatedFrame::default(),
                timer: FakeTimer::default(),
            }
        }

        fn dispatch(&mut self, event: ClientEvent) -> Dispatch {
            Dispatcher {
                transport: &self.transport,
                client: &mut self.client,
                frame: Some(&mut self.frame),
                timer: &mut self.timer,
            }
            .dispatch(event)
        }

        fn dispatch_unframed(&mut self, event: ClientEvent) -> Dispatch {
            Dispatcher {
                transport: &self.transport,
                client: &mut self.client,
                frame: None,
                timer: &mut self.timer,
            }
            .dispatch(event)
        }

        fn message(&mut self, message_type: Atom, data: [u32; 5]) -> Dispatch {
            self.dispatch(ClientEvent::Message {
                message_type,
                format: 32,
                data,
            })
        }
    }

    #[test]
    fn deleted_title_is_cleared_and_notified() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set_text(WINDOW, atoms._NET_WM_NAME, "editor");
        let mut harness = Harness::new(transport);
        assert_eq!(harness.client.window_title(), Some("editor"));

        harness.transport.remove(WINDOW, atoms._NET_WM_NAME);
        let outcome = harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms._NET_WM_NAME,
            deleted: true,
        });

        assert_eq!(outcome, Dispatch::Handled);
        assert!(!harness.client.has(PropertyKind::NetWmName));
        assert_eq!(harness.client.window_title(), None);
        assert_eq!(harness.frame.notifications, vec![FrameNotification::TitleChanged(None)]);
        assert!(!harness.transport.has(WINDOW, atoms._NET_WM_VISIBLE_NAME));
    }

    #[test]
    fn legacy_title_shows_through_when_net_name_goes_away() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set_text(WINDOW, atoms.WM_NAME, "xterm");
        transport.set_text(WINDOW, atoms._NET_WM_NAME, "Terminal");
        let mut harness = Harness::new(transport);

        harness.transport.remove(WINDOW, atoms._NET_WM_NAME);
        harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms._NET_WM_NAME,
            deleted: true,
        });
        assert_eq!(harness.client.window_title(), Some("xterm"));
    }

    #[test]
    fn new_property_flips_flag_and_notifies() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        harness
            .transport
            .set32(WINDOW, atoms._NET_WM_STRUT, atoms.CARDINAL, &[0, 0, 30, 0]);
        harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms._NET_WM_STRUT,
            deleted: false,
        });

        assert!(harness.client.has(PropertyKind::NetWmStrut));
        match harness.frame.notifications.as_slice() {
            [FrameNotification::StrutChanged(Some(strut))] => assert_eq!(strut.top, 30),
            other => panic!("unexpected notifications: {other:?}"),
        }
    }

    #[test]
    fn untracked_property_is_forwarded() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);
        let outcome = harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms._NET_ACTIVE_WINDOW,
            deleted: false,
        });
        assert_eq!(outcome, Dispatch::Forwarded);
        assert_eq!(harness.message(9999, [0; 5]), Dispatch::Forwarded);
    }

    #[test]
    fn kwm_icon_is_shadowed_by_net_icon() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set32(WINDOW, atoms._NET_WM_ICON, atoms.CARDINAL, &[1, 1, 0]);
        let mut harness = Harness::new(transport);

        harness
            .transport
            .set32(WINDOW, atoms.KWM_WIN_ICON, atoms.KWM_WIN_ICON, &[3, 4]);
        harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms.KWM_WIN_ICON,
            deleted: false,
        });
        assert!(harness.frame.notifications.is_empty());

        harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms._NET_WM_ICON,
            deleted: false,
        });
        assert_eq!(harness.frame.notifications, vec![FrameNotification::IconChanged]);
    }

    #[test]
    fn urgency_hint_flip_is_notified() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        let urgency = crate::icccm::WmHintFlags::URGENCY.bits();
        harness
            .transport
            .set32(WINDOW, atoms.WM_HINTS, atoms.WM_HINTS, &[urgency, 0, 0, 0, 0, 0, 0, 0, 0]);
        harness.dispatch(ClientEvent::PropertyChanged {
            atom: atoms.WM_HINTS,
            deleted: false,
        });
        assert_eq!(harness.frame.notifications, vec![FrameNotification::UrgencyHintChanged(true)]);
    }

    #[test]
    fn state_message_runs_the_reconciler() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        let outcome = harness.message(atoms._NET_WM_STATE, [
            1,
            atoms._NET_WM_STATE_MAXIMIZED_VERT,
            atoms._NET_WM_STATE_MAXIMIZED_HORZ,
            0,
            0,
        ]);
        assert_eq!(
            outcome,
            Dispatch::Reconciled(vec![FrameCommand::Perform(FrameAction::Maximize)])
        );
        assert!(harness.frame.is_maximized());
    }

    #[test]
    fn focused_bit_is_stripped_from_state_requests() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        let outcome = harness.message(atoms._NET_WM_STATE, [1, atoms._NET_WM_STATE_FOCUSED, 0, 0, 0]);
        assert_eq!(outcome, Dispatch::Handled);
        assert_eq!(harness.frame.state, WindowState::empty());
    }

    #[test]
    fn change_state_requests() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        harness.message(atoms.WM_CHANGE_STATE, [FrameState::Iconic as u32, 0, 0, 0, 0]);
        harness.message(atoms.WM_CHANGE_STATE, [FrameState::Iconic as u32, 0, 0, 0, 0]);
        assert_eq!(harness.frame.actions, vec![FrameAction::Minimize]);

        harness.message(atoms.WM_CHANGE_STATE, [FrameState::Normal as u32, 0, 0, 0, 0]);
        assert_eq!(harness.frame.actions.last(), Some(&FrameAction::Restore));
        assert!(!harness.frame.is_unmapped());

        harness.message(atoms.WM_CHANGE_STATE, [FrameState::Withdrawn as u32, 0, 0, 0, 0]);
        assert_eq!(harness.frame.actions.last(), Some(&FrameAction::Hide));
    }

    #[test]
    fn activation_can_be_ignored() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let settings = ClientSettings {
            ignore_activation_messages: true,
            ..ClientSettings::default()
        };
        let mut harness = Harness::with_settings(transport, settings);
        assert_eq!(harness.message(atoms._NET_ACTIVE_WINDOW, [1, 0, 0, 0, 0]), Dispatch::Handled);
        assert!(harness.frame.actions.is_empty());

        let mut harness = Harness::new(FakeTransport::new());
        harness.message(atoms._NET_ACTIVE_WINDOW, [1, 0, 0, 0, 0]);
        assert_eq!(harness.frame.actions, vec![FrameAction::Activate, FrameAction::Raise]);
    }

    #[test]
    fn moveresize_window_uses_low_byte_gravity_and_mask() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);

        // South-east gravity, x and width selected.
        let flags = 9 | (0b0101 << 8);
        harness.message(atoms._NET_MOVERESIZE_WINDOW, [flags, 50, 60, 300, 200]);
        let request = harness.frame.configures[0];
        assert_eq!(request.gravity, Gravity::SouthEast);
        assert_eq!(request.value_mask, 0b0101);
        assert_eq!(harness.frame.geometry.loc, Point::from((50, 0)));
        assert_eq!(harness.frame.geometry.size, Size::from((300, 480)));

        harness.message(atoms._NET_MOVERESIZE_WINDOW, [0, 0, 0, 0, 0]);
        assert_eq!(harness.frame.configures[1].gravity, Gravity::NorthWest);
    }

    #[test]
    fn restack_rejects_unknown_detail() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);
        harness.message(atoms._NET_RESTACK_WINDOW, [2, 0x99, 7, 0, 0]);
        harness.message(atoms._NET_RESTACK_WINDOW, [2, 0x99, 1, 0, 0]);
        assert_eq!(harness.frame.restacks, vec![(0x99, StackMode::Below)]);
    }

    #[test]
    fn hint_messages_fall_back_to_properties_without_a_frame() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        let mut harness = Harness::new(transport);
        let message = |message_type, value| ClientEvent::Message {
            message_type,
            format: 32,
            data: [value, 0, 0, 0, 0],
        };

        harness.dispatch_unframed(message(atoms._NET_WM_DESKTOP, 2));
        harness.dispatch_unframed(message(atoms._WIN_LAYER, 8));
        harness.dispatch_unframed(message(atoms._WIN_TRAY, 2));
        harness.dispatch_unframed(message(atoms._NET_WM_DESKTOP, 40));
        assert_eq!(harness.transport.get32(WINDOW, atoms._NET_WM_DESKTOP), Some(vec![2]));
        assert_eq!(harness.transport.get32(WINDOW, atoms._WIN_LAYER), Some(vec![8]));
        assert_eq!(harness.transport.get32(WINDOW, atoms._WIN_TRAY), Some(vec![2]));

        harness.dispatch(message(atoms._WIN_LAYER, 6));
        assert_eq!(harness.frame.requested_layer(), Layer::ON_TOP);
        harness.dispatch(message(atoms._NET_WM_DESKTOP, 0xFFFF_FFFF));
        assert_eq!(harness.frame.workspace, 0xFFFF_FFFF);
    }

    #[test]
    fn ping_reply_is_routed_to_liveness() {
        let transport = FakeTransport::new();
        let atoms = transport.atoms;
        transport.set32(WINDOW, atoms.WM_PROTOCOLS, atoms.ATOM, &[atoms._NET_WM_PING]);
        let mut harness = Harness::new(transport);
        assert!(matches!(
            harness.client.send_ping(&harness.transport, &mut harness.timer),
            Ok(true)
        ));

        let forged = [atoms._NET_WM_PING, 999, WINDOW, 0, 0];
        assert_eq!(harness.message(atoms.WM_PROTOCOLS, forged), Dispatch::Handled);
        assert!(harness.client.liveness().is_pending());

        let reply = [atoms._NET_WM_PING, 1000, WINDOW, 0, 0];
        harness.message(atoms.WM_PROTOCOLS, reply);
        assert!(!harness.client.liveness().is_pending());
        assert_eq!(harness.timer.cancelled, vec![WINDOW]);
    }
}
