//! Interned atoms used by the client adapter.
//!
//! Predefined core atoms (`WM_NAME`, `CARDINAL`, ...) are listed alongside the
//! ICCCM/EWMH ones; interning a predefined name returns its fixed value, so the
//! table stays uniform.

use x11rb::protocol::xproto::Atom;

macro_rules! atoms {
    ($($name:ident),* $(,)?) => {
        #[allow(non_snake_case)]
        #[derive(Clone, Copy, Debug)]
        pub struct Atoms {
            $(pub $name: Atom,)*
        }

        impl Atoms {
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name),)*];

            /// Builds the table by resolving each name in declaration order.
            pub fn from_fn<F, E>(mut resolve: F) -> Result<Self, E>
            where
                F: FnMut(&str) -> Result<Atom, E>,
            {
                Ok(Self {
                    $($name: resolve(stringify!($name))?,)*
                })
            }

            pub fn name_of(&self, atom: Atom) -> Option<&'static str> {
                $(
                    if self.$name == atom {
                        return Some(stringify!($name));
                    }
                )*
                None
            }
        }
    };
}

atoms! {
    ATOM,
    CARDINAL,
    WINDOW,
    PIXMAP,
    STRING,
    UTF8_STRING,
    COMPOUND_TEXT,

    WM_NAME,
    WM_ICON_NAME,
    WM_CLASS,
    WM_HINTS,
    WM_NORMAL_HINTS,
    WM_SIZE_HINTS,
    WM_TRANSIENT_FOR,
    WM_CLIENT_MACHINE,
    WM_PROTOCOLS,
    WM_DELETE_WINDOW,
    WM_TAKE_FOCUS,
    WM_STATE,
    WM_CHANGE_STATE,
    WM_CLIENT_LEADER,
    WM_WINDOW_ROLE,
    WINDOW_ROLE,
    SM_CLIENT_ID,

    _MOTIF_WM_HINTS,
    KWM_WIN_ICON,
    _KDE_NET_WM_SYSTEM_TRAY_WINDOW_FOR,
    _XEMBED_INFO,

    _WIN_TRAY,
    _WIN_LAYER,
    _WIN_ICONS,

    _NET_WM_NAME,
    _NET_WM_ICON_NAME,
    _NET_WM_VISIBLE_NAME,
    _NET_WM_VISIBLE_ICON_NAME,
    _NET_WM_ICON,
    _NET_WM_PID,
    _NET_WM_PING,
    _NET_WM_DESKTOP,
    _NET_WM_STRUT,
    _NET_WM_STRUT_PARTIAL,
    _NET_WM_USER_TIME,
    _NET_WM_USER_TIME_WINDOW,
    _NET_WM_WINDOW_OPACITY,
    _NET_WM_FULLSCREEN_MONITORS,
    _NET_WM_ALLOWED_ACTIONS,
    _NET_FRAME_EXTENTS,
    _NET_STARTUP_ID,
    _NET_ACTIVE_WINDOW,
    _NET_CLOSE_WINDOW,
    _NET_RESTACK_WINDOW,
    _NET_WM_MOVERESIZE,
    _NET_MOVERESIZE_WINDOW,

    _NET_WM_STATE,
    _NET_WM_STATE_ABOVE,
    _NET_WM_STATE_BELOW,
    _NET_WM_STATE_DEMANDS_ATTENTION,
    _NET_WM_STATE_FOCUSED,
    _NET_WM_STATE_FULLSCREEN,
    _NET_WM_STATE_HIDDEN,
    _NET_WM_STATE_MAXIMIZED_HORZ,
    _NET_WM_STATE_MAXIMIZED_VERT,
    _NET_WM_STATE_MODAL,
    _NET_WM_STATE_SHADED,
    _NET_WM_STATE_SKIP_PAGER,
    _NET_WM_STATE_SKIP_TASKBAR,
    _NET_WM_STATE_STICKY,

    _NET_WM_WINDOW_TYPE,
    _NET_WM_WINDOW_TYPE_COMBO,
    _NET_WM_WINDOW_TYPE_DESKTOP,
    _NET_WM_WINDOW_TYPE_DIALOG,
    _NET_WM_WINDOW_TYPE_DND,
    _NET_WM_WINDOW_TYPE_DOCK,
    _NET_WM_WINDOW_TYPE_DROPDOWN_MENU,
    _NET_WM_WINDOW_TYPE_MENU,
    _NET_WM_WINDOW_TYPE_NORMAL,
    _NET_WM_WINDOW_TYPE_NOTIFICATION,
    _NET_WM_WINDOW_TYPE_POPUP_MENU,
    _NET_WM_WINDOW_TYPE_SPLASH,
    _NET_WM_WINDOW_TYPE_TOOLBAR,
    _NET_WM_WINDOW_TYPE_TOOLTIP,
    _NET_WM_WINDOW_TYPE_UTILITY,
}

#[cfg(test)]
impl Atoms {
    /// Distinct non-zero values, assigned in declaration order starting at 100.
    pub fn sequential() -> Self {
        let mut next = 100;
        Self::from_fn::<_, std::convert::Infallible>(|_| {
            next += 1;
            Ok(next)
        })
        .unwrap_or_else(|never| match never {})
    }
}
