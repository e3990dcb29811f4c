//! Extended window manager hints: window state, type, struts, layers and
//! timestamps.

use bitflags::bitflags;
use x11rb::protocol::xproto::{Atom, Timestamp};

use crate::atoms::Atoms;

bitflags! {
    /// Frame state bits. The frame owns the authoritative value.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WindowState: u32 {
        const MINIMIZED = 1 << 0;
        const ROLLED_UP = 1 << 1;
        const HIDDEN = 1 << 2;
        const MAXIMIZED_HORZ = 1 << 3;
        const MAXIMIZED_VERT = 1 << 4;
        const FULLSCREEN = 1 << 5;
        const STICKY = 1 << 6;
        const ABOVE = 1 << 7;
        const BELOW = 1 << 8;
        const MODAL = 1 << 9;
        const URGENT = 1 << 10;
        const SKIP_TASKBAR = 1 << 11;
        const SKIP_PAGER = 1 << 12;
        const FOCUSED = 1 << 13;

        const UNMAPPED = Self::MINIMIZED.bits() | Self::ROLLED_UP.bits() | Self::HIDDEN.bits();
        const MAXIMIZED_BOTH = Self::MAXIMIZED_HORZ.bits() | Self::MAXIMIZED_VERT.bits();
    }
}

impl WindowState {
    /// Maps one `_NET_WM_STATE_*` atom. Unknown atoms map to nothing.
    pub fn from_atom(atoms: &Atoms, atom: Atom) -> Self {
        if atom == 0 {
            return Self::empty();
        }
        Self::table(atoms)
            .into_iter()
            .find(|(candidate, _)| *candidate == atom)
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    /// Decodes a `_NET_WM_STATE` list as read at adoption time. Minimized
    /// wins over rolled-up; focus is only honoured while the manager starts.
    pub fn from_atom_list(
        atoms: &Atoms,
        listed: impl IntoIterator<Item = Atom>,
        starting_up: bool,
    ) -> Self {
        let mut state: Self = listed
            .into_iter()
            .map(|atom| Self::from_atom(atoms, atom))
            .collect();
        if state.contains(Self::MINIMIZED) {
            state.remove(Self::ROLLED_UP);
        }
        if !starting_up {
            state.remove(Self::FOCUSED);
        }
        state
    }

    /// Atoms written back to `_NET_WM_STATE`, in protocol order.
    pub fn to_atoms(self, atoms: &Atoms) -> Vec<Atom> {
        let mut listed = Vec::with_capacity(13);
        if self.intersects(Self::MINIMIZED | Self::HIDDEN) {
            listed.push(atoms._NET_WM_STATE_HIDDEN);
        } else if self.contains(Self::FOCUSED) && !self.contains(Self::ROLLED_UP) {
            listed.push(atoms._NET_WM_STATE_FOCUSED);
        }
        let ordered = [
            (Self::SKIP_PAGER, atoms._NET_WM_STATE_SKIP_PAGER),
            (Self::SKIP_TASKBAR, atoms._NET_WM_STATE_SKIP_TASKBAR),
            (Self::STICKY, atoms._NET_WM_STATE_STICKY),
            (Self::ROLLED_UP, atoms._NET_WM_STATE_SHADED),
            (Self::ABOVE, atoms._NET_WM_STATE_ABOVE),
            (Self::BELOW, atoms._NET_WM_STATE_BELOW),
            (Self::MODAL, atoms._NET_WM_STATE_MODAL),
            (Self::FULLSCREEN, atoms._NET_WM_STATE_FULLSCREEN),
            (Self::MAXIMIZED_VERT, atoms._NET_WM_STATE_MAXIMIZED_VERT),
            (Self::MAXIMIZED_HORZ, atoms._NET_WM_STATE_MAXIMIZED_HORZ),
            (Self::URGENT, atoms._NET_WM_STATE_DEMANDS_ATTENTION),
        ];
        listed.extend(
            ordered
                .into_iter()
                .filter(|(bit, _)| self.contains(*bit))
                .map(|(_, atom)| atom),
        );
        listed
    }

    fn table(atoms: &Atoms) -> [(Atom, Self); 13] {
        [
            (atoms._NET_WM_STATE_ABOVE, Self::ABOVE),
            (atoms._NET_WM_STATE_BELOW, Self::BELOW),
            (atoms._NET_WM_STATE_DEMANDS_ATTENTION, Self::URGENT),
            (atoms._NET_WM_STATE_FOCUSED, Self::FOCUSED),
            (atoms._NET_WM_STATE_FULLSCREEN, Self::FULLSCREEN),
            (atoms._NET_WM_STATE_HIDDEN, Self::MINIMIZED),
            (atoms._NET_WM_STATE_MAXIMIZED_HORZ, Self::MAXIMIZED_HORZ),
            (atoms._NET_WM_STATE_MAXIMIZED_VERT, Self::MAXIMIZED_VERT),
            (atoms._NET_WM_STATE_MODAL, Self::MODAL),
            (atoms._NET_WM_STATE_SHADED, Self::ROLLED_UP),
            (atoms._NET_WM_STATE_SKIP_PAGER, Self::SKIP_PAGER),
            (atoms._NET_WM_STATE_SKIP_TASKBAR, Self::SKIP_TASKBAR),
            (atoms._NET_WM_STATE_STICKY, Self::STICKY),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowType {
    Combo,
    Desktop,
    Dialog,
    Dnd,
    Dock,
    DropdownMenu,
    Menu,
    Normal,
    Notification,
    PopupMenu,
    Splash,
    Toolbar,
    Tooltip,
    Utility,
}

impl WindowType {
    /// The first recognised type in the client's preference list.
    pub fn from_atoms(atoms: &Atoms, listed: impl IntoIterator<Item = Atom>) -> Option<Self> {
        let table = [
            (atoms._NET_WM_WINDOW_TYPE_COMBO, WindowType::Combo),
            (atoms._NET_WM_WINDOW_TYPE_DESKTOP, WindowType::Desktop),
            (atoms._NET_WM_WINDOW_TYPE_DIALOG, WindowType::Dialog),
            (atoms._NET_WM_WINDOW_TYPE_DND, WindowType::Dnd),
            (atoms._NET_WM_WINDOW_TYPE_DOCK, WindowType::Dock),
            (atoms._NET_WM_WINDOW_TYPE_DROPDOWN_MENU, WindowType::DropdownMenu),
            (atoms._NET_WM_WINDOW_TYPE_MENU, WindowType::Menu),
            (atoms._NET_WM_WINDOW_TYPE_NORMAL, WindowType::Normal),
            (atoms._NET_WM_WINDOW_TYPE_NOTIFICATION, WindowType::Notification),
            (atoms._NET_WM_WINDOW_TYPE_POPUP_MENU, WindowType::PopupMenu),
            (atoms._NET_WM_WINDOW_TYPE_SPLASH, WindowType::Splash),
            (atoms._NET_WM_WINDOW_TYPE_TOOLBAR, WindowType::Toolbar),
            (atoms._NET_WM_WINDOW_TYPE_TOOLTIP, WindowType::Tooltip),
            (atoms._NET_WM_WINDOW_TYPE_UTILITY, WindowType::Utility),
        ];
        listed.into_iter().find_map(|atom| {
            table
                .iter()
                .find(|(candidate, _)| *candidate == atom)
                .map(|(_, kind)| *kind)
        })
    }
}

/// Reserved screen edges in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Strut {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Strut {
    /// `_NET_WM_STRUT` carries exactly four cardinals.
    pub fn from_strut(words: &[u32]) -> Option<Self> {
        match words {
            [left, right, top, bottom] => Some(Self::new(*left, *right, *top, *bottom)),
            _ => None,
        }
    }

    /// `_NET_WM_STRUT_PARTIAL` carries twelve; only the edge widths are kept.
    pub fn from_partial(words: &[u32]) -> Option<Self> {
        if words.len() != 12 {
            return None;
        }
        Some(Self::new(words[0], words[1], words[2], words[3]))
    }

    fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Stacking layer from the `_WIN_LAYER` hint family, 0..=15.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layer(u8);

impl Layer {
    pub const DESKTOP: Layer = Layer(0);
    pub const BELOW: Layer = Layer(2);
    pub const NORMAL: Layer = Layer(4);
    pub const ON_TOP: Layer = Layer(6);
    pub const DOCK: Layer = Layer(8);
    pub const ABOVE_DOCK: Layer = Layer(10);
    pub const MENU: Layer = Layer(12);
    pub const FULLSCREEN: Layer = Layer(14);
    pub const ABOVE_ALL: Layer = Layer(15);

    pub fn new(raw: u32) -> Option<Self> {
        (raw <= u32::from(Self::ABOVE_ALL.0)).then_some(Layer(raw as u8))
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Layer::NORMAL
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrayOption {
    #[default]
    Ignore,
    Minimized,
    Exclusive,
}

impl TrayOption {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(TrayOption::Ignore),
            1 => Some(TrayOption::Minimized),
            2 => Some(TrayOption::Exclusive),
            _ => None,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

pub const ALL_WORKSPACES: u32 = 0xFFFF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workspace {
    All,
    Index(u32),
}

impl Workspace {
    /// Rejects indices at or beyond `count`.
    pub fn from_raw(raw: u32, count: u32) -> Option<Self> {
        if raw == ALL_WORKSPACES {
            Some(Workspace::All)
        } else if raw < count {
            Some(Workspace::Index(raw))
        } else {
            None
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Workspace::All => ALL_WORKSPACES,
            Workspace::Index(index) => index,
        }
    }
}

/// `CurrentTime` is reserved, so a client timestamp of all ones moves down one.
pub fn user_time(raw: u32) -> Timestamp {
    if raw == u32::MAX { u32::MAX - 1 } else { raw }
}

/// Extracts the launch timestamp from a `..._TIME<n>` startup id.
pub fn startup_time(startup_id: &str) -> Option<Timestamp> {
    let (_, tail) = startup_id.split_once("_TIME")?;
    let tail = tail.trim_start();
    let (negative, digits) = match tail.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tail.strip_prefix('+').unwrap_or(tail)),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(u64::from(digit - b'0'))
        });
    let value = if negative { value.wrapping_neg() } else { value };
    Some(user_time(value as u32))
}
