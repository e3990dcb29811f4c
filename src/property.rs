//! Tracks which optional metadata a client window currently advertises.
//!
//! The cache only records presence. Values are fetched through the transport
//! by whoever consumes a flag flip, and a failed fetch never changes presence.

use x11rb::protocol::xproto::Atom;

use crate::atoms::Atoms;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    WmName,
    WmIconName,
    WmClass,
    WmHints,
    WmNormalHints,
    WmTransientFor,
    WmProtocols,
    WmClientLeader,
    WmWindowRole,
    WindowRole,
    WmState,
    SmClientId,
    MwmHints,
    KwmWinIcon,
    KdeNetWmSystemTrayWindowFor,
    NetWmName,
    NetWmIconName,
    NetWmIcon,
    NetWmStrut,
    NetWmStrutPartial,
    NetWmDesktop,
    NetWmPid,
    NetWmState,
    NetWmWindowType,
    NetStartupId,
    NetWmUserTime,
    NetWmUserTimeWindow,
    NetWmWindowOpacity,
    WinTray,
    WinLayer,
    WinIcons,
    XembedInfo,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 32] = [
        PropertyKind::WmName,
        PropertyKind::WmIconName,
        PropertyKind::WmClass,
        PropertyKind::WmHints,
        PropertyKind::WmNormalHints,
        PropertyKind::WmTransientFor,
        PropertyKind::WmProtocols,
        PropertyKind::WmClientLeader,
        PropertyKind::WmWindowRole,
        PropertyKind::WindowRole,
        PropertyKind::WmState,
        PropertyKind::SmClientId,
        PropertyKind::MwmHints,
        PropertyKind::KwmWinIcon,
        PropertyKind::KdeNetWmSystemTrayWindowFor,
        PropertyKind::NetWmName,
        PropertyKind::NetWmIconName,
        PropertyKind::NetWmIcon,
        PropertyKind::NetWmStrut,
        PropertyKind::NetWmStrutPartial,
        PropertyKind::NetWmDesktop,
        PropertyKind::NetWmPid,
        PropertyKind::NetWmState,
        PropertyKind::NetWmWindowType,
        PropertyKind::NetStartupId,
        PropertyKind::NetWmUserTime,
        PropertyKind::NetWmUserTimeWindow,
        PropertyKind::NetWmWindowOpacity,
        PropertyKind::WinTray,
        PropertyKind::WinLayer,
        PropertyKind::WinIcons,
        PropertyKind::XembedInfo,
    ];

    pub fn atom(self, atoms: &Atoms) -> Atom {
        match self {
            PropertyKind::WmName => atoms.WM_NAME,
            PropertyKind::WmIconName => atoms.WM_ICON_NAME,
            PropertyKind::WmClass => atoms.WM_CLASS,
            PropertyKind::WmHints => atoms.WM_HINTS,
            PropertyKind::WmNormalHints => atoms.WM_NORMAL_HINTS,
            PropertyKind::WmTransientFor => atoms.WM_TRANSIENT_FOR,
            PropertyKind::WmProtocols => atoms.WM_PROTOCOLS,
            PropertyKind::WmClientLeader => atoms.WM_CLIENT_LEADER,
            PropertyKind::WmWindowRole => atoms.WM_WINDOW_ROLE,
            PropertyKind::WindowRole => atoms.WINDOW_ROLE,
            PropertyKind::WmState => atoms.WM_STATE,
            PropertyKind::SmClientId => atoms.SM_CLIENT_ID,
            PropertyKind::MwmHints => atoms._MOTIF_WM_HINTS,
            PropertyKind::KwmWinIcon => atoms.KWM_WIN_ICON,
            PropertyKind::KdeNetWmSystemTrayWindowFor => atoms._KDE_NET_WM_SYSTEM_TRAY_WINDOW_FOR,
            PropertyKind::NetWmName => atoms._NET_WM_NAME,
            PropertyKind::NetWmIconName => atoms._NET_WM_ICON_NAME,
            PropertyKind::NetWmIcon => atoms._NET_WM_ICON,
            PropertyKind::NetWmStrut => atoms._NET_WM_STRUT,
            PropertyKind::NetWmStrutPartial => atoms._NET_WM_STRUT_PARTIAL,
            PropertyKind::NetWmDesktop => atoms._NET_WM_DESKTOP,
            PropertyKind::NetWmPid => atoms._NET_WM_PID,
            PropertyKind::NetWmState => atoms._NET_WM_STATE,
            PropertyKind::NetWmWindowType => atoms._NET_WM_WINDOW_TYPE,
            PropertyKind::NetStartupId => atoms._NET_STARTUP_ID,
            PropertyKind::NetWmUserTime => atoms._NET_WM_USER_TIME,
            PropertyKind::NetWmUserTimeWindow => atoms._NET_WM_USER_TIME_WINDOW,
            PropertyKind::NetWmWindowOpacity => atoms._NET_WM_WINDOW_OPACITY,
            PropertyKind::WinTray => atoms._WIN_TRAY,
            PropertyKind::WinLayer => atoms._WIN_LAYER,
            PropertyKind::WinIcons => atoms._WIN_ICONS,
            PropertyKind::XembedInfo => atoms._XEMBED_INFO,
        }
    }

    pub fn from_atom(atoms: &Atoms, atom: Atom) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.atom(atoms) == atom)
    }

    fn bit(self) -> u64 {
        1 << self as u8
    }
}

/// Fixed-size presence bitset indexed by [`PropertyKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertySet(u64);

impl PropertySet {
    pub fn contains(self, kind: PropertyKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: PropertyKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: PropertyKind) {
        self.0 &= !kind.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PropertyKind> {
        PropertyKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<PropertyKind> for PropertySet {
    fn from_iter<I: IntoIterator<Item = PropertyKind>>(iter: I) -> Self {
        let mut set = PropertySet::default();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyCache {
    present: PropertySet,
}

impl PropertyCache {
    pub fn has(&self, kind: PropertyKind) -> bool {
        self.present.contains(kind)
    }

    /// Returns true when the flag flipped from absent to present.
    pub fn mark_present(&mut self, kind: PropertyKind) -> bool {
        let was = self.has(kind);
        self.present.insert(kind);
        !was
    }

    /// Returns true when the flag flipped from present to absent.
    pub fn mark_absent(&mut self, kind: PropertyKind) -> bool {
        let was = self.has(kind);
        self.present.remove(kind);
        was
    }

    pub fn set(&mut self, kind: PropertyKind, present: bool) {
        if present {
            self.present.insert(kind);
        } else {
            self.present.remove(kind);
        }
    }

    /// Replaces every flag with the bulk listing. Atoms that are not tracked
    /// metadata are skipped.
    pub fn reload(&mut self, atoms: &Atoms, listed: &[Atom]) {
        self.present = listed
            .iter()
            .filter_map(|atom| PropertyKind::from_atom(atoms, *atom))
            .collect();
        tracing::trace!(present = ?self.present, "property cache reloaded");
    }

    pub fn present(&self) -> PropertySet {
        self.present
    }
}
