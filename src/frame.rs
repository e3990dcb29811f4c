//! The window manager frame as seen from the client adapter.
//!
//! The frame owns the authoritative [`WindowState`]; the adapter only asks
//! for actions and reads state back. [`SimulatedFrame`] is a self-contained
//! model used by the CLI's `watch` command and by tests.

use smithay::utils::{Logical, Point, Rectangle, Size};
use x11rb::protocol::xproto::Window;

use crate::{
    ewmh::{Layer, Strut, TrayOption, WindowState},
    hints::Gravity,
};

/// Frame operations the adapter may request. Each one is absolute: it names
/// the state to reach, not a toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
    Minimize,
    Unminimize,
    Rollup,
    Unrollup,
    Hide,
    Show,
    /// Leave every unmapped and maximized state.
    Restore,
    Maximize,
    /// Maximized vertically only.
    MaximizeVert,
    /// Maximized horizontally only.
    MaximizeHoriz,
    Fullscreen,
    Unfullscreen,
    ToggleSticky,
    SetLayer(Layer),
    Close,
    Activate,
    Raise,
}

/// Change notifications pushed from the adapter to the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameNotification {
    IconChanged,
    TitleChanged(Option<String>),
    IconTitleChanged(Option<String>),
    /// The WM_HINTS urgency bit flipped.
    UrgencyHintChanged(bool),
    StrutChanged(Option<Strut>),
    UserTimeChanged(u32),
    UserTimeWindowChanged(Window),
    ClassChanged,
    SizeHintsChanged,
    MotifHintsChanged,
    TransientChanged { old: Window, new: Window },
    OpacityChanged(Option<u32>),
}

/// `_NET_RESTACK_WINDOW` detail, mirroring the core stack modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

impl StackMode {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(StackMode::Above),
            1 => Some(StackMode::Below),
            2 => Some(StackMode::TopIf),
            3 => Some(StackMode::BottomIf),
            4 => Some(StackMode::Opposite),
            _ => None,
        }
    }
}

/// A synthesized configure request from `_NET_MOVERESIZE_WINDOW`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigureRequest {
    /// Bits 0..=3 select x, y, width, height.
    pub value_mask: u8,
    pub geometry: Rectangle<i32, Logical>,
    pub gravity: Gravity,
}

pub trait FrameControl {
    fn state(&self) -> WindowState;

    /// Replaces the bits in `mask` with the ones set in `gain`.
    fn set_state(&mut self, mask: WindowState, gain: WindowState);

    fn perform(&mut self, action: FrameAction);

    fn is_maximized(&self) -> bool {
        self.state().intersects(WindowState::MAXIMIZED_BOTH)
    }

    fn is_fullscreen(&self) -> bool {
        self.state().contains(WindowState::FULLSCREEN)
    }

    fn is_unmapped(&self) -> bool {
        self.state().intersects(WindowState::UNMAPPED)
    }

    fn is_all_workspaces(&self) -> bool {
        self.state().contains(WindowState::STICKY)
    }

    fn requested_layer(&self) -> Layer;

    fn geometry(&self) -> Rectangle<i32, Logical>;

    fn set_wm_urgency(&mut self, urgent: bool);

    fn notify(&mut self, notification: FrameNotification);

    fn restack(&mut self, sibling: Window, mode: StackMode);

    fn start_move_size(&mut self, x: i32, y: i32, direction: u32);

    fn configure_client(&mut self, request: ConfigureRequest);

    fn set_workspace(&mut self, workspace: u32);

    fn update_fullscreen_monitors(&mut self, monitors: [u32; 4]);

    fn set_tray_option(&mut self, option: TrayOption);
}

/// In-memory frame that applies actions to its own state and records every
/// call it receives.
#[derive(Clone, Debug)]
pub struct SimulatedFrame {
    pub state: WindowState,
    pub layer: Layer,
    pub geometry: Rectangle<i32, Logical>,
    pub urgency: bool,
    pub workspace: u32,
    pub tray: TrayOption,
    pub fullscreen_monitors: Option<[u32; 4]>,
    pub actions: Vec<FrameAction>,
    pub notifications: Vec<FrameNotification>,
    pub restacks: Vec<(Window, StackMode)>,
    pub move_size: Vec<(i32, i32, u32)>,
    pub configures: Vec<ConfigureRequest>,
}

impl Default for SimulatedFrame {
    fn default() -> Self {
        Self::with_state(WindowState::empty())
    }
}

impl SimulatedFrame {
    pub fn with_state(state: WindowState) -> Self {
        Self {
            state,
            layer: Layer::NORMAL,
            geometry: Rectangle {
                loc: Point::from((0, 0)),
                size: Size::from((640, 480)),
            },
            urgency: false,
            workspace: 0,
            tray: TrayOption::default(),
            fullscreen_monitors: None,
            actions: Vec::new(),
            notifications: Vec::new(),
            restacks: Vec::new(),
            move_size: Vec::new(),
            configures: Vec::new(),
        }
    }

    fn set_maximized(&mut self, axes: WindowState) {
        self.state.remove(WindowState::MAXIMIZED_BOTH);
        self.state.insert(axes & WindowState::MAXIMIZED_BOTH);
    }
}

impl FrameControl for SimulatedFrame {
    fn state(&self) -> WindowState {
        self.state
    }

    fn set_state(&mut self, mask: WindowState, gain: WindowState) {
        self.state = (self.state - mask) | (gain & mask);
    }

    fn perform(&mut self, action: FrameAction) {
        tracing::trace!(?action, state = ?self.state, "frame action");
        self.actions.push(action);
        match action {
            FrameAction::Minimize => self.state.insert(WindowState::MINIMIZED),
            FrameAction::Unminimize => self.state.remove(WindowState::MINIMIZED),
            FrameAction::Rollup => self.state.insert(WindowState::ROLLED_UP),
            FrameAction::Unrollup => self.state.remove(WindowState::ROLLED_UP),
            FrameAction::Hide => self.state.insert(WindowState::HIDDEN),
            FrameAction::Show => self.state.remove(WindowState::HIDDEN),
            FrameAction::Restore => self
                .state
                .remove(WindowState::UNMAPPED | WindowState::MAXIMIZED_BOTH),
            FrameAction::Maximize => self.set_maximized(WindowState::MAXIMIZED_BOTH),
            FrameAction::MaximizeVert => self.set_maximized(WindowState::MAXIMIZED_VERT),
            FrameAction::MaximizeHoriz => self.set_maximized(WindowState::MAXIMIZED_HORZ),
            FrameAction::Fullscreen => self.state.insert(WindowState::FULLSCREEN),
            FrameAction::Unfullscreen => self.state.remove(WindowState::FULLSCREEN),
            FrameAction::ToggleSticky => self.state.toggle(WindowState::STICKY),
            FrameAction::SetLayer(layer) => {
                self.layer = layer;
                self.state.remove(WindowState::ABOVE | WindowState::BELOW);
                if layer == Layer::ON_TOP {
                    self.state.insert(WindowState::ABOVE);
                } else if layer == Layer::BELOW {
                    self.state.insert(WindowState::BELOW);
                }
            }
            FrameAction::Activate => self.state.insert(WindowState::FOCUSED),
            FrameAction::Close | FrameAction::Raise => {}
        }
    }

    fn requested_layer(&self) -> Layer {
        self.layer
    }

    fn geometry(&self) -> Rectangle<i32, Logical> {
        self.geometry
    }

    fn set_wm_urgency(&mut self, urgent: bool) {
        self.urgency = urgent;
        self.state.set(WindowState::URGENT, urgent);
    }

    fn notify(&mut self, notification: FrameNotification) {
        tracing::trace!(?notification, "frame notified");
        self.notifications.push(notification);
    }

    fn restack(&mut self, sibling: Window, mode: StackMode) {
        self.restacks.push((sibling, mode));
    }

    fn start_move_size(&mut self, x: i32, y: i32, direction: u32) {
        self.move_size.push((x, y, direction));
    }

    fn configure_client(&mut self, request: ConfigureRequest) {
        let mut geometry = self.geometry;
        if request.value_mask & 1 != 0 {
            geometry.loc.x = request.geometry.loc.x;
        }
        if request.value_mask & 2 != 0 {
            geometry.loc.y = request.geometry.loc.y;
        }
        if request.value_mask & 4 != 0 {
            geometry.size.w = request.geometry.size.w;
        }
        if request.value_mask & 8 != 0 {
            geometry.size.h = request.geometry.size.h;
        }
        self.geometry = geometry;
        self.configures.push(request);
    }

    fn set_workspace(&mut self, workspace: u32) {
        self.workspace = workspace;
    }

    fn update_fullscreen_monitors(&mut self, monitors: [u32; 4]) {
        self.fullscreen_monitors = Some(monitors);
    }

    fn set_tray_option(&mut self, option: TrayOption) {
        self.tray = option;
    }
}
