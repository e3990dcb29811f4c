//! Per-window adapter state: cached presence flags plus the values derived
//! from them, and the writers for properties the window manager owns.

use std::{cell::Cell, time::Duration};

use smithay::utils::{Logical, Size};
use x11rb::protocol::xproto::{Atom, Pixmap, Window};

use crate::{
    Result,
    ewmh::{Layer, Strut, TrayOption, WindowState, WindowType, Workspace},
    hints::{
        self, ConstrainFlags, MWM_HINTS_ELEMENTS, MotifHints, MwmDecorations, MwmFunctions,
        RawSizeHints, SIZE_HINTS_ELEMENTS, SizeHints,
    },
    icccm::{ClassHint, FrameState, Protocols, WM_HINTS_ELEMENTS, WmHints},
    identity::IdentityInfo,
    liveness::{DEFAULT_PING_TIMEOUT, Escalation, LivenessMonitor, OwnerChain, ProcessControl},
    property::{PropertyCache, PropertyKind, PropertySet},
    transport::{ProbeTimer, RawProperty, Transport},
};

/// Largest `_NET_WM_ICON` accepted, in 32-bit units.
const NET_WM_ICON_MAX_LEN: u32 = 1 << 22;

/// Policy knobs the adapter needs from the manager configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientSettings {
    pub ping_timeout: Duration,
    pub workspace_count: u32,
    pub consider_size_hints_maximized: bool,
    pub ignore_activation_messages: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            ping_timeout: DEFAULT_PING_TIMEOUT,
            workspace_count: 4,
            consider_size_hints_maximized: false,
            ignore_activation_messages: false,
        }
    }
}

/// Icon sources in decreasing order of preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientIcon {
    /// ARGB images as width, height, pixels... repeated.
    NetWm(Vec<u32>),
    WinIcons { type_: Atom, data: Vec<u32> },
    Kwm { pixmap: Pixmap, mask: Pixmap },
    WmHints { pixmap: Pixmap, mask: Pixmap },
}

#[derive(Debug)]
pub struct FrameClient {
    window: Window,
    settings: ClientSettings,
    cache: PropertyCache,
    warned: Cell<PropertySet>,
    protocols: Protocols,
    size_hints: SizeHints,
    wm_hints: Option<WmHints>,
    motif_hints: Option<MotifHints>,
    class_hint: ClassHint,
    transient_for: Window,
    window_title: Option<String>,
    icon_title: Option<String>,
    identity: IdentityInfo,
    liveness: LivenessMonitor,
    saved_frame_state: Option<FrameState>,
    written_state: Option<WindowState>,
}

impl FrameClient {
    pub fn new(window: Window, settings: ClientSettings) -> Self {
        Self {
            window,
            settings,
            cache: PropertyCache::default(),
            warned: Cell::new(PropertySet::default()),
            protocols: Protocols::empty(),
            size_hints: SizeHints::default(),
            wm_hints: None,
            motif_hints: None,
            class_hint: ClassHint::default(),
            transient_for: 0,
            window_title: None,
            icon_title: None,
            identity: IdentityInfo::default(),
            liveness: LivenessMonitor::new(settings.ping_timeout),
            saved_frame_state: None,
            written_state: None,
        }
    }

    /// Takes a window under management: snapshots its property list, then
    /// derives every cached value.
    pub fn adopt(
        transport: &dyn Transport,
        window: Window,
        settings: ClientSettings,
    ) -> Result<Self> {
        let mut client = Self::new(window, settings);
        client.reload_properties(transport)?;
        client.read_protocols(transport);
        client.read_size_hints(transport);
        client.read_wm_hints(transport);
        client.read_class_hint(transport);
        client.read_transient(transport);
        client.read_motif_hints(transport);
        client.read_window_role(transport);
        client.refresh_title(transport);
        client.refresh_icon_title(transport);
        tracing::debug!(window, present = ?client.cache.present(), "client adopted");
        Ok(client)
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn cache(&self) -> &PropertyCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PropertyCache {
        &mut self.cache
    }

    pub fn has(&self, kind: PropertyKind) -> bool {
        self.cache.has(kind)
    }

    pub fn reload_properties(&mut self, transport: &dyn Transport) -> Result<()> {
        let listed = transport.list_properties(self.window)?;
        self.cache.reload(transport.atoms(), &listed);
        Ok(())
    }

    fn warn_malformed(&self, kind: PropertyKind, prop: &RawProperty) {
        let mut warned = self.warned.get();
        if warned.contains(kind) {
            return;
        }
        warned.insert(kind);
        self.warned.set(warned);
        tracing::warn!(
            window = self.window,
            ?kind,
            type_ = prop.type_,
            format = prop.format,
            len = prop.len(),
            "ignoring malformed property"
        );
    }

    /// Fetches an advertised 32-bit property. Wrong type or format counts as
    /// absent; read failures are logged and also count as absent.
    fn fetch32(
        &self,
        transport: &dyn Transport,
        kind: PropertyKind,
        type_: Atom,
        long_length: u32,
    ) -> Option<RawProperty> {
        if !self.cache.has(kind) {
            return None;
        }
        let atom = kind.atom(transport.atoms());
        match transport.get_property(self.window, atom, type_, long_length) {
            Ok(Some(prop)) if prop.format == 32 && (type_ == 0 || prop.type_ == type_) => {
                Some(prop)
            }
            Ok(Some(prop)) => {
                self.warn_malformed(kind, &prop);
                None
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(window = self.window, ?kind, "failed to read property: {err}");
                None
            }
        }
    }

    fn fetch_words(
        &self,
        transport: &dyn Transport,
        kind: PropertyKind,
        type_: Atom,
        long_length: u32,
    ) -> Option<Vec<u32>> {
        self.fetch32(transport, kind, type_, long_length)
            .and_then(|prop| prop.value32().map(|words| words.collect()))
    }

    fn fetch_cardinal(
        &self,
        transport: &dyn Transport,
        kind: PropertyKind,
        type_: Atom,
    ) -> Option<u32> {
        let prop = self.fetch32(transport, kind, type_, 1)?;
        let value = prop.value32().and_then(|mut words| words.next());
        if value.is_none() {
            self.warn_malformed(kind, &prop);
        }
        value
    }

    fn fetch_text(&self, transport: &dyn Transport, kind: PropertyKind) -> Option<String> {
        if !self.cache.has(kind) {
            return None;
        }
        match transport.text_property(self.window, kind.atom(transport.atoms())) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(window = self.window, ?kind, "failed to read text property: {err}");
                None
            }
        }
    }

    pub fn protocols(&self) -> Protocols {
        self.protocols
    }

    /// Re-reads WM_PROTOCOLS. Support for WM_DELETE_WINDOW, once seen, is
    /// never withdrawn.
    pub fn read_protocols(&mut self, transport: &dyn Transport) {
        self.protocols &= Protocols::DELETE_WINDOW;
        let atom_type = transport.atoms().ATOM;
        if let Some(words) = self.fetch_words(transport, PropertyKind::WmProtocols, atom_type, 64) {
            self.protocols |= Protocols::from_atoms(transport.atoms(), words);
        }
    }

    pub fn size_hints(&self) -> &SizeHints {
        &self.size_hints
    }

    /// Returns true when the normalized hints changed.
    pub fn read_size_hints(&mut self, transport: &dyn Transport) -> bool {
        let size_type = transport.atoms().WM_SIZE_HINTS;
        let raw = self
            .fetch_words(
                transport,
                PropertyKind::WmNormalHints,
                size_type,
                SIZE_HINTS_ELEMENTS,
            )
            .map(|words| RawSizeHints::from_words(&words));
        let hints = hints::normalize(raw.as_ref());
        let changed = hints != self.size_hints;
        self.size_hints = hints;
        changed
    }

    pub fn wm_hints(&self) -> Option<&WmHints> {
        self.wm_hints.as_ref()
    }

    pub fn urgency_hint(&self) -> bool {
        self.wm_hints.is_some_and(|hints| hints.urgent())
    }

    pub fn read_wm_hints(&mut self, transport: &dyn Transport) {
        let hints_type = transport.atoms().WM_HINTS;
        self.wm_hints = self
            .fetch_words(transport, PropertyKind::WmHints, hints_type, WM_HINTS_ELEMENTS)
            .map(|words| WmHints::from_words(&words));
        // The window group seeds the leader, so it is re-derived with the hints.
        self.read_client_leader(transport);
    }

    pub fn class_hint(&self) -> &ClassHint {
        &self.class_hint
    }

    /// Returns true when a non-empty class replaced a different one.
    pub fn read_class_hint(&mut self, transport: &dyn Transport) -> bool {
        if !self.cache.has(PropertyKind::WmClass) {
            self.class_hint = ClassHint::default();
            return false;
        }
        let atoms = transport.atoms();
        let hint = match transport.get_property(self.window, atoms.WM_CLASS, atoms.STRING, 256) {
            Ok(Some(prop)) if prop.format == 8 => ClassHint::from_bytes(&prop.value),
            Ok(Some(prop)) => {
                self.warn_malformed(PropertyKind::WmClass, &prop);
                ClassHint::default()
            }
            Ok(None) => ClassHint::default(),
            Err(err) => {
                tracing::warn!(window = self.window, "failed to read WM_CLASS: {err}");
                return false;
            }
        };
        let changed = !hint.is_empty() && hint != self.class_hint;
        self.class_hint = hint;
        changed
    }

    pub fn transient_for(&self) -> Option<Window> {
        (self.transient_for != 0).then_some(self.transient_for)
    }

    /// Returns the previous owner when the transient-for target changed.
    pub fn read_transient(&mut self, transport: &dyn Transport) -> Option<Window> {
        let window_type = transport.atoms().WINDOW;
        let owner = self
            .fetch_cardinal(transport, PropertyKind::WmTransientFor, window_type)
            .filter(|owner| *owner != self.window)
            .unwrap_or(0);
        if owner == self.transient_for {
            return None;
        }
        Some(std::mem::replace(&mut self.transient_for, owner))
    }

    pub fn motif_hints(&self) -> Option<&MotifHints> {
        self.motif_hints.as_ref()
    }

    pub fn read_motif_hints(&mut self, transport: &dyn Transport) {
        let motif_type = transport.atoms()._MOTIF_WM_HINTS;
        self.motif_hints = self
            .fetch_words(transport, PropertyKind::MwmHints, motif_type, MWM_HINTS_ELEMENTS)
            .map(|words| MotifHints::from_words(&words));
    }

    pub fn set_motif_hints(&mut self, transport: &dyn Transport, motif: MotifHints) -> Result<()> {
        let atom = transport.atoms()._MOTIF_WM_HINTS;
        transport.change_property32(self.window, atom, atom, &motif.to_words())?;
        self.motif_hints = Some(motif);
        Ok(())
    }

    pub fn functions(&self) -> MwmFunctions {
        hints::allowed_functions(self.motif_hints.as_ref(), &self.size_hints)
    }

    pub fn decorations(&self) -> MwmDecorations {
        hints::allowed_decorations(self.motif_hints.as_ref(), &self.size_hints)
    }

    /// Clamps a requested size to the hints. Maximized windows skip the
    /// hints unless configured otherwise.
    pub fn constrain_size(
        &self,
        size: Size<i32, Logical>,
        mut flags: ConstrainFlags,
        maximized: bool,
    ) -> Size<i32, Logical> {
        if maximized && !self.settings.consider_size_hints_maximized {
            flags |= ConstrainFlags::IGNORE_HINTS;
        }
        hints::clamp(size, &self.size_hints, flags)
    }

    pub fn gravity_offset(&self) -> (i32, i32) {
        self.size_hints.gravity_offset()
    }

    pub fn identity(&self) -> &IdentityInfo {
        &self.identity
    }

    pub fn client_leader(&self) -> Option<Window> {
        (self.identity.client_leader != 0).then_some(self.identity.client_leader)
    }

    /// WM_CLIENT_LEADER, falling back to the WM_HINTS window group.
    pub fn read_client_leader(&mut self, transport: &dyn Transport) {
        let window_type = transport.atoms().WINDOW;
        let group = self.wm_hints.map(|hints| hints.window_group()).unwrap_or(0);
        self.identity.client_leader = self
            .fetch_cardinal(transport, PropertyKind::WmClientLeader, window_type)
            .unwrap_or(group);
    }

    pub fn read_window_role(&mut self, transport: &dyn Transport) {
        let kind = if self.cache.has(PropertyKind::WmWindowRole) {
            PropertyKind::WmWindowRole
        } else {
            PropertyKind::WindowRole
        };
        self.identity.role = self.fetch_text(transport, kind);
    }

    /// SM_CLIENT_ID as set on the client leader.
    pub fn sm_client_id(&self, transport: &dyn Transport) -> Option<String> {
        if !self.cache.has(PropertyKind::SmClientId) {
            return None;
        }
        let leader = self.client_leader().unwrap_or(self.window);
        transport
            .text_property(leader, transport.atoms().SM_CLIENT_ID)
            .unwrap_or_else(|err| {
                tracing::warn!(window = self.window, leader, "failed to read SM_CLIENT_ID: {err}");
                None
            })
    }

    pub fn pid(&mut self, transport: &dyn Transport) -> Option<u32> {
        let advertised = self.cache.has(PropertyKind::NetWmPid);
        self.identity
            .resolve_pid(transport, self.window, advertised)
            .unwrap_or_else(|err| {
                tracing::warn!(window = self.window, "failed to resolve pid: {err}");
                None
            })
    }

    pub fn window_title(&self) -> Option<&str> {
        self.window_title.as_deref()
    }

    pub fn icon_title(&self) -> Option<&str> {
        self.icon_title.as_deref()
    }

    /// Re-derives the title, `_NET_WM_NAME` first. Returns true on change.
    pub fn refresh_title(&mut self, transport: &dyn Transport) -> bool {
        let title = self
            .fetch_text(transport, PropertyKind::NetWmName)
            .or_else(|| self.fetch_text(transport, PropertyKind::WmName));
        self.set_window_title(transport, title)
    }

    pub fn refresh_icon_title(&mut self, transport: &dyn Transport) -> bool {
        let title = self
            .fetch_text(transport, PropertyKind::NetWmIconName)
            .or_else(|| self.fetch_text(transport, PropertyKind::WmIconName));
        self.set_icon_title(transport, title)
    }

    /// Stores the title and mirrors it to `_NET_WM_VISIBLE_NAME`.
    pub fn set_window_title(&mut self, transport: &dyn Transport, title: Option<String>) -> bool {
        if title == self.window_title {
            return false;
        }
        let atom = transport.atoms()._NET_WM_VISIBLE_NAME;
        self.write_visible_name(transport, atom, title.as_deref());
        self.window_title = title;
        true
    }

    pub fn set_icon_title(&mut self, transport: &dyn Transport, title: Option<String>) -> bool {
        if title == self.icon_title {
            return false;
        }
        let atom = transport.atoms()._NET_WM_VISIBLE_ICON_NAME;
        self.write_visible_name(transport, atom, title.as_deref());
        self.icon_title = title;
        true
    }

    fn write_visible_name(&self, transport: &dyn Transport, atom: Atom, title: Option<&str>) {
        let result = match title {
            Some(title) => {
                let utf8 = transport.atoms().UTF8_STRING;
                transport.change_property8(self.window, atom, utf8, title.as_bytes())
            }
            None => transport.delete_property(self.window, atom),
        };
        if let Err(err) = result {
            tracing::warn!(window = self.window, "failed to update visible name: {err}");
        }
    }

    pub fn frame_state(&mut self, transport: &dyn Transport) -> FrameState {
        let state_type = transport.atoms().WM_STATE;
        let state = self
            .fetch_words(transport, PropertyKind::WmState, state_type, 2)
            .and_then(|words| words.first().copied())
            .and_then(FrameState::from_raw);
        self.saved_frame_state = state;
        state.unwrap_or(FrameState::Withdrawn)
    }

    /// Writes WM_STATE. Withdrawing a window strips every property the window
    /// manager put on it, except while the manager itself is shutting down.
    pub fn set_frame_state(
        &mut self,
        transport: &dyn Transport,
        state: FrameState,
        shutting_down: bool,
    ) -> Result<()> {
        let atoms = *transport.atoms();
        if state == FrameState::Withdrawn {
            if shutting_down {
                return Ok(());
            }
            tracing::debug!(window = self.window, "withdrawing window properties");
            for atom in [
                atoms._NET_FRAME_EXTENTS,
                atoms._NET_WM_ALLOWED_ACTIONS,
                atoms._NET_WM_DESKTOP,
                atoms._NET_WM_STATE,
                atoms._NET_WM_VISIBLE_ICON_NAME,
                atoms._NET_WM_VISIBLE_NAME,
                atoms._WIN_LAYER,
                atoms.WM_STATE,
            ] {
                transport.delete_property(self.window, atom)?;
            }
            self.saved_frame_state = None;
            self.written_state = None;
            return Ok(());
        }
        if self.saved_frame_state == Some(state) {
            return Ok(());
        }
        transport.change_property32(self.window, atoms.WM_STATE, atoms.WM_STATE, &[
            state as u32,
            0,
        ])?;
        self.saved_frame_state = Some(state);
        Ok(())
    }

    pub fn net_wm_state(&self, transport: &dyn Transport, starting_up: bool) -> WindowState {
        let atom_type = transport.atoms().ATOM;
        self.fetch_words(transport, PropertyKind::NetWmState, atom_type, 32)
            .map(|words| WindowState::from_atom_list(transport.atoms(), words, starting_up))
            .unwrap_or_default()
    }

    /// Publishes `state` as `_NET_WM_STATE`. Returns false when it matches
    /// what was last written.
    pub fn write_net_wm_state(
        &mut self,
        transport: &dyn Transport,
        state: WindowState,
    ) -> Result<bool> {
        if self.written_state == Some(state) {
            return Ok(false);
        }
        let atoms = transport.atoms();
        let listed = state.to_atoms(atoms);
        transport.change_property32(self.window, atoms._NET_WM_STATE, atoms.ATOM, &listed)?;
        self.written_state = Some(state);
        tracing::trace!(window = self.window, ?state, "wrote _NET_WM_STATE");
        Ok(true)
    }

    /// `_NET_WM_STRUT`, ignored whenever the partial variant exists.
    pub fn strut(&self, transport: &dyn Transport) -> Option<Strut> {
        if self.cache.has(PropertyKind::NetWmStrutPartial) {
            return None;
        }
        let cardinal = transport.atoms().CARDINAL;
        let words = self.fetch_words(transport, PropertyKind::NetWmStrut, cardinal, 4)?;
        Strut::from_strut(&words)
    }

    pub fn strut_partial(&self, transport: &dyn Transport) -> Option<Strut> {
        let cardinal = transport.atoms().CARDINAL;
        let words = self.fetch_words(transport, PropertyKind::NetWmStrutPartial, cardinal, 12)?;
        Strut::from_partial(&words)
    }

    /// Whichever strut the client declares, partial first.
    pub fn effective_strut(&self, transport: &dyn Transport) -> Option<Strut> {
        self.strut_partial(transport)
            .or_else(|| self.strut(transport))
    }

    pub fn user_time(&self, transport: &dyn Transport) -> Option<u32> {
        let cardinal = transport.atoms().CARDINAL;
        self.fetch_cardinal(transport, PropertyKind::NetWmUserTime, cardinal)
            .map(crate::ewmh::user_time)
    }

    pub fn user_time_window(&self, transport: &dyn Transport) -> Option<Window> {
        let window_type = transport.atoms().WINDOW;
        self.fetch_cardinal(transport, PropertyKind::NetWmUserTimeWindow, window_type)
    }

    pub fn startup_time(&self, transport: &dyn Transport) -> Option<u32> {
        self.fetch_text(transport, PropertyKind::NetStartupId)
            .and_then(|id| crate::ewmh::startup_time(&id))
    }

    pub fn window_type(&self, transport: &dyn Transport) -> Option<WindowType> {
        let words = self.fetch_words(transport, PropertyKind::NetWmWindowType, 0, 16)?;
        WindowType::from_atoms(transport.atoms(), words)
    }

    pub fn opacity(&self, transport: &dyn Transport) -> Option<u32> {
        let cardinal = transport.atoms().CARDINAL;
        self.fetch_cardinal(transport, PropertyKind::NetWmWindowOpacity, cardinal)
    }

    pub fn desktop(&self, transport: &dyn Transport) -> Option<Workspace> {
        let cardinal = transport.atoms().CARDINAL;
        let raw = self.fetch_cardinal(transport, PropertyKind::NetWmDesktop, cardinal)?;
        let workspace = Workspace::from_raw(raw, self.settings.workspace_count);
        if workspace.is_none() {
            tracing::debug!(window = self.window, raw, "_NET_WM_DESKTOP out of range");
        }
        workspace
    }

    pub fn layer(&self, transport: &dyn Transport) -> Option<Layer> {
        let cardinal = transport.atoms().CARDINAL;
        self.fetch_cardinal(transport, PropertyKind::WinLayer, cardinal)
            .and_then(Layer::new)
    }

    pub fn tray_option(&self, transport: &dyn Transport) -> Option<TrayOption> {
        let cardinal = transport.atoms().CARDINAL;
        self.fetch_cardinal(transport, PropertyKind::WinTray, cardinal)
            .and_then(TrayOption::from_raw)
    }

    pub fn set_workspace_hint(&self, transport: &dyn Transport, workspace: u32) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(self.window, atoms._NET_WM_DESKTOP, atoms.CARDINAL, &[
            workspace,
        ])
    }

    pub fn set_layer_hint(&self, transport: &dyn Transport, layer: Layer) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(self.window, atoms._WIN_LAYER, atoms.CARDINAL, &[
            layer.get()
        ])
    }

    pub fn set_tray_hint(&self, transport: &dyn Transport, option: TrayOption) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(self.window, atoms._WIN_TRAY, atoms.CARDINAL, &[
            option.to_raw()
        ])
    }

    pub fn set_frame_extents(
        &self,
        transport: &dyn Transport,
        left: u32,
        right: u32,
        top: u32,
        bottom: u32,
    ) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(self.window, atoms._NET_FRAME_EXTENTS, atoms.CARDINAL, &[
            left, right, top, bottom,
        ])
    }

    pub fn set_allowed_actions(&self, transport: &dyn Transport, actions: &[Atom]) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(self.window, atoms._NET_WM_ALLOWED_ACTIONS, atoms.ATOM, actions)
    }

    pub fn set_fullscreen_monitors(
        &self,
        transport: &dyn Transport,
        monitors: [u32; 4],
    ) -> Result<()> {
        let atoms = transport.atoms();
        transport.change_property32(
            self.window,
            atoms._NET_WM_FULLSCREEN_MONITORS,
            atoms.CARDINAL,
            &monitors,
        )
    }

    /// The preferred icon source that is currently advertised.
    pub fn icon(&self, transport: &dyn Transport) -> Option<ClientIcon> {
        let atoms = transport.atoms();
        if let Some(data) =
            self.fetch_words(transport, PropertyKind::NetWmIcon, atoms.CARDINAL, NET_WM_ICON_MAX_LEN)
        {
            return Some(ClientIcon::NetWm(data));
        }
        if let Some(prop) = self.fetch32(transport, PropertyKind::WinIcons, 0, 4096)
            && (prop.type_ == atoms._WIN_ICONS || prop.type_ == atoms.PIXMAP)
        {
            let data = prop.value32().map(|words| words.collect()).unwrap_or_default();
            return Some(ClientIcon::WinIcons {
                type_: prop.type_,
                data,
            });
        }
        if let Some(words) =
            self.fetch_words(transport, PropertyKind::KwmWinIcon, atoms.KWM_WIN_ICON, 2)
            && let &[pixmap, mask] = words.as_slice()
        {
            return Some(ClientIcon::Kwm { pixmap, mask });
        }
        self.wm_hints
            .map(|hints| (hints.icon_pixmap(), hints.icon_mask()))
            .filter(|(pixmap, _)| *pixmap != 0)
            .map(|(pixmap, mask)| ClientIcon::WmHints { pixmap, mask })
    }

    fn send_protocol(&self, transport: &dyn Transport, protocol: Atom) -> Result<()> {
        let atoms = transport.atoms();
        transport.send_client_message(self.window, atoms.WM_PROTOCOLS, [
            protocol,
            transport.event_time(),
            0,
            0,
            0,
        ])
    }

    pub fn send_take_focus(&self, transport: &dyn Transport) -> Result<bool> {
        if !self.protocols.contains(Protocols::TAKE_FOCUS) {
            return Ok(false);
        }
        self.send_protocol(transport, transport.atoms().WM_TAKE_FOCUS)?;
        Ok(true)
    }

    pub fn send_delete(&self, transport: &dyn Transport) -> Result<bool> {
        if !self.protocols.contains(Protocols::DELETE_WINDOW) {
            return Ok(false);
        }
        self.send_protocol(transport, transport.atoms().WM_DELETE_WINDOW)?;
        Ok(true)
    }

    pub fn liveness(&self) -> &LivenessMonitor {
        &self.liveness
    }

    pub fn send_ping(
        &mut self,
        transport: &dyn Transport,
        timer: &mut dyn ProbeTimer,
    ) -> Result<bool> {
        let supports_ping = self.protocols.contains(Protocols::PING);
        self.liveness
            .send_probe(transport, timer, self.window, supports_ping)
    }

    pub fn receive_ping(
        &mut self,
        transport: &dyn Transport,
        data: [u32; 5],
        timer: &mut dyn ProbeTimer,
    ) -> bool {
        let ping = transport.atoms()._NET_WM_PING;
        self.liveness.on_reply(ping, self.window, data, timer)
    }

    /// Escalates an unanswered ping through this window and its transient
    /// owners.
    pub fn ping_timed_out(
        &mut self,
        transport: &dyn Transport,
        process: &mut dyn ProcessControl,
    ) -> Escalation {
        let window = self.window;
        let mut liveness = std::mem::take(&mut self.liveness);
        let outcome = {
            let mut chain = TransientChain {
                transport,
                root: self,
            };
            liveness.on_timeout(window, &mut chain, process)
        };
        self.liveness = liveness;
        outcome
    }
}

/// Walks WM_TRANSIENT_FOR starting at an adopted client. Windows other than
/// the root are read directly from the transport.
struct TransientChain<'a> {
    transport: &'a dyn Transport,
    root: &'a mut FrameClient,
}

impl OwnerChain for TransientChain<'_> {
    fn resolve_pid(&mut self, window: Window) -> Option<u32> {
        if window == self.root.window {
            return self.root.pid(self.transport);
        }
        let advertised = self
            .transport
            .list_properties(window)
            .map(|listed| listed.contains(&self.transport.atoms()._NET_WM_PID))
            .unwrap_or(false);
        IdentityInfo::default()
            .resolve_pid(self.transport, window, advertised)
            .ok()
            .flatten()
    }

    fn owner_of(&self, window: Window) -> Option<Window> {
        if window == self.root.window {
            return self.root.transient_for();
        }
        let atoms = self.transport.atoms();
        self.transport
            .get_property(window, atoms.WM_TRANSIENT_FOR, atoms.WINDOW, 1)
            .ok()
            .flatten()
            .and_then(|prop| prop.value32().and_then(|mut words| words.next()))
            .filter(|owner| *owner != 0 && *owner != window)
    }
}
