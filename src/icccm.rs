//! ICCCM property payloads: WM_HINTS, WM_CLASS, WM_PROTOCOLS and WM_STATE.

use bitflags::bitflags;
use x11rb::protocol::xproto::{Atom, Pixmap, Window};

use crate::atoms::Atoms;

/// Element count of a full WM_HINTS property.
pub const WM_HINTS_ELEMENTS: u32 = 9;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WmHintFlags: u32 {
        const INPUT = 1 << 0;
        const STATE = 1 << 1;
        const ICON_PIXMAP = 1 << 2;
        const ICON_WINDOW = 1 << 3;
        const ICON_POSITION = 1 << 4;
        const ICON_MASK = 1 << 5;
        const WINDOW_GROUP = 1 << 6;
        const URGENCY = 1 << 8;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WmHints {
    pub flags: WmHintFlags,
    pub input: bool,
    pub initial_state: u32,
    pub icon_pixmap: Pixmap,
    pub icon_window: Window,
    pub icon_position: (i32, i32),
    pub icon_mask: Pixmap,
    pub window_group: Window,
}

impl WmHints {
    pub fn from_words(words: &[u32]) -> Self {
        let mut values = [0u32; WM_HINTS_ELEMENTS as usize];
        let len = values.len().min(words.len());
        values[..len].copy_from_slice(&words[..len]);

        Self {
            flags: WmHintFlags::from_bits_truncate(values[0]),
            input: values[1] != 0,
            initial_state: values[2],
            icon_pixmap: values[3],
            icon_window: values[4],
            icon_position: (values[5] as i32, values[6] as i32),
            icon_mask: values[7],
            window_group: values[8],
        }
    }

    fn flagged<T: Default>(&self, flag: WmHintFlags, value: T) -> T {
        if self.flags.contains(flag) { value } else { T::default() }
    }

    pub fn icon_pixmap(&self) -> Pixmap {
        self.flagged(WmHintFlags::ICON_PIXMAP, self.icon_pixmap)
    }

    pub fn icon_mask(&self) -> Pixmap {
        self.flagged(WmHintFlags::ICON_MASK, self.icon_mask)
    }

    pub fn icon_window(&self) -> Window {
        self.flagged(WmHintFlags::ICON_WINDOW, self.icon_window)
    }

    pub fn window_group(&self) -> Window {
        self.flagged(WmHintFlags::WINDOW_GROUP, self.window_group)
    }

    pub fn urgent(&self) -> bool {
        self.flags.contains(WmHintFlags::URGENCY)
    }
}

/// WM_CLASS instance and class names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassHint {
    pub res_name: String,
    pub res_class: String,
}

impl ClassHint {
    /// WM_CLASS holds two consecutive NUL-terminated strings.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut parts = bytes
            .split(|byte| *byte == 0)
            .map(|part| String::from_utf8_lossy(part).into_owned());
        Self {
            res_name: parts.next().unwrap_or_default(),
            res_class: parts.next().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.res_name.is_empty() && self.res_class.is_empty()
    }

    /// Matches `name`, `name.class` or `.class`.
    pub fn matches(&self, resource: &str) -> bool {
        if resource.is_empty() {
            return false;
        }
        let class = match resource.strip_prefix('.') {
            Some(class) => class,
            None => {
                if self.res_name.is_empty() {
                    return false;
                }
                let Some(rest) = resource.strip_prefix(self.res_name.as_str()) else {
                    return false;
                };
                if rest.is_empty() {
                    return true;
                }
                let Some(class) = rest.strip_prefix('.') else {
                    return false;
                };
                class
            }
        };
        class == self.res_class
    }

    /// `name.class`, or `None` when both parts are empty.
    pub fn resource(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("{}.{}", self.res_name, self.res_class))
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Protocols: u32 {
        const DELETE_WINDOW = 1 << 0;
        const TAKE_FOCUS = 1 << 1;
        const PING = 1 << 2;
    }
}

impl Protocols {
    pub fn from_atoms(atoms: &Atoms, listed: impl IntoIterator<Item = Atom>) -> Self {
        listed
            .into_iter()
            .map(|atom| {
                if atom == atoms.WM_DELETE_WINDOW {
                    Protocols::DELETE_WINDOW
                } else if atom == atoms.WM_TAKE_FOCUS {
                    Protocols::TAKE_FOCUS
                } else if atom == atoms._NET_WM_PING {
                    Protocols::PING
                } else {
                    Protocols::empty()
                }
            })
            .collect()
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    #[default]
    Withdrawn = 0,
    Normal = 1,
    Iconic = 3,
}

impl FrameState {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(FrameState::Withdrawn),
            1 => Some(FrameState::Normal),
            3 => Some(FrameState::Iconic),
            _ => None,
        }
    }
}
