//! Turns `_NET_WM_STATE` add/remove/toggle requests into frame actions.
//!
//! Rules run in a fixed order over two working sets, `gain` and `lose`.
//! Every command is executed against the frame as soon as it is decided and
//! the frame state is re-read before the next rule, since one action may move
//! more than the bit it targets.

use crate::{
    ewmh::{Layer, WindowState},
    frame::{FrameAction, FrameControl},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

impl StateAction {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(StateAction::Remove),
            1 => Some(StateAction::Add),
            2 => Some(StateAction::Toggle),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateRequest {
    pub action: StateAction,
    pub mask: WindowState,
}

/// One effect issued to the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameCommand {
    Perform(FrameAction),
    SetState {
        mask: WindowState,
        gain: WindowState,
    },
    SetUrgency(bool),
}

impl FrameCommand {
    pub fn apply(self, frame: &mut dyn FrameControl) {
        match self {
            FrameCommand::Perform(action) => frame.perform(action),
            FrameCommand::SetState { mask, gain } => frame.set_state(mask, gain),
            FrameCommand::SetUrgency(urgent) => frame.set_wm_urgency(urgent),
        }
    }
}

struct Run<'a> {
    frame: &'a mut dyn FrameControl,
    issued: Vec<FrameCommand>,
}

impl Run<'_> {
    fn issue(&mut self, command: FrameCommand) {
        command.apply(self.frame);
        self.issued.push(command);
    }

    fn perform(&mut self, action: FrameAction) {
        self.issue(FrameCommand::Perform(action));
    }
}

const UNMAPPED: WindowState = WindowState::UNMAPPED;
const MAXIMIZED: WindowState = WindowState::MAXIMIZED_BOTH;
const FULL_OR_MAX: WindowState = WindowState::FULLSCREEN.union(WindowState::MAXIMIZED_BOTH);
const LAYERED: WindowState = WindowState::ABOVE.union(WindowState::BELOW);

/// Applies `request` to `frame` and returns the commands that were issued,
/// in order.
pub fn reconcile(frame: &mut dyn FrameControl, request: StateRequest) -> Vec<FrameCommand> {
    let mut state = frame.state();
    let mask = request.mask;
    let mut gain = match request.action {
        StateAction::Add | StateAction::Toggle => mask - state,
        StateAction::Remove => WindowState::empty(),
    };
    let mut lose = match request.action {
        StateAction::Remove | StateAction::Toggle => mask & state,
        StateAction::Add => WindowState::empty(),
    };
    tracing::debug!(?request, ?state, ?gain, ?lose, "reconciling state request");

    let mut run = Run {
        frame,
        issued: Vec::new(),
    };

    // Entering an unmapped state supersedes everything geometric.
    if gain.intersects(UNMAPPED) {
        let action = if gain.contains(WindowState::MINIMIZED) {
            FrameAction::Minimize
        } else if gain.contains(WindowState::ROLLED_UP) {
            FrameAction::Rollup
        } else {
            FrameAction::Hide
        };
        run.perform(action);
        gain -= UNMAPPED | FULL_OR_MAX;
        lose -= UNMAPPED;
        state = run.frame.state();
    }

    // Maximizing or going fullscreen implies leaving the unmapped state.
    if gain.intersects(FULL_OR_MAX) && state.intersects(UNMAPPED) {
        lose |= state & UNMAPPED;
    }

    let leaving = lose & (UNMAPPED | MAXIMIZED);
    if !leaving.is_empty() && leaving == state & (UNMAPPED | MAXIMIZED) {
        run.perform(FrameAction::Restore);
        lose -= leaving;
        state = run.frame.state();
    }

    if lose.intersects(FULL_OR_MAX) {
        if run.frame.is_unmapped() {
            run.issue(FrameCommand::SetState {
                mask: lose & FULL_OR_MAX,
                gain: WindowState::empty(),
            });
        } else {
            if lose.contains(WindowState::FULLSCREEN) && run.frame.is_fullscreen() {
                run.perform(FrameAction::Unfullscreen);
                state = run.frame.state();
            }
            if lose.intersects(MAXIMIZED) && run.frame.is_maximized() {
                let keep = (state & MAXIMIZED) - lose;
                let action = if keep == WindowState::MAXIMIZED_VERT {
                    FrameAction::MaximizeVert
                } else if keep == WindowState::MAXIMIZED_HORZ {
                    FrameAction::MaximizeHoriz
                } else {
                    FrameAction::Restore
                };
                run.perform(action);
                state = run.frame.state();
            }
        }
        lose -= FULL_OR_MAX;
    }

    if lose.intersects(UNMAPPED) {
        let active = state & UNMAPPED;
        let action = if active.contains(WindowState::MINIMIZED) {
            FrameAction::Unminimize
        } else if active.contains(WindowState::ROLLED_UP) {
            FrameAction::Unrollup
        } else {
            FrameAction::Show
        };
        run.perform(action);
        lose -= UNMAPPED;
    }

    if gain.intersects(FULL_OR_MAX) {
        if gain.contains(WindowState::FULLSCREEN) {
            if !run.frame.is_fullscreen() {
                run.perform(FrameAction::Fullscreen);
            }
        } else {
            let have = run.frame.state() & MAXIMIZED;
            let want = have | (gain & MAXIMIZED);
            if want != have {
                let action = if want == MAXIMIZED {
                    FrameAction::Maximize
                } else if want == WindowState::MAXIMIZED_VERT {
                    FrameAction::MaximizeVert
                } else {
                    FrameAction::MaximizeHoriz
                };
                run.perform(action);
            }
        }
        gain -= FULL_OR_MAX;
    }

    if gain.contains(WindowState::STICKY) {
        if !run.frame.is_all_workspaces() {
            run.perform(FrameAction::ToggleSticky);
        }
        gain.remove(WindowState::STICKY);
    }
    if lose.contains(WindowState::STICKY) {
        if run.frame.is_all_workspaces() {
            run.perform(FrameAction::ToggleSticky);
        }
        lose.remove(WindowState::STICKY);
    }

    if gain.intersects(LAYERED) {
        let requested = gain & LAYERED;
        if requested == WindowState::ABOVE {
            run.perform(FrameAction::SetLayer(Layer::ON_TOP));
        } else if requested == WindowState::BELOW {
            run.perform(FrameAction::SetLayer(Layer::BELOW));
        }
        gain -= LAYERED;
        lose -= LAYERED;
    }
    if lose.intersects(LAYERED) {
        if lose.contains(WindowState::ABOVE) && run.frame.requested_layer() == Layer::ON_TOP {
            run.perform(FrameAction::SetLayer(Layer::NORMAL));
        }
        if lose.contains(WindowState::BELOW) && run.frame.requested_layer() == Layer::BELOW {
            run.perform(FrameAction::SetLayer(Layer::NORMAL));
        }
        lose -= LAYERED;
    }

    if gain.contains(WindowState::URGENT) {
        run.issue(FrameCommand::SetUrgency(true));
        gain.remove(WindowState::URGENT);
    }
    if lose.contains(WindowState::URGENT) {
        run.issue(FrameCommand::SetUrgency(false));
        lose.remove(WindowState::URGENT);
    }

    if !(gain | lose).is_empty() {
        run.issue(FrameCommand::SetState {
            mask: gain | lose,
            gain,
        });
    }

    run.issued
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SimulatedFrame;

    fn request(action: StateAction, mask: WindowState) -> StateRequest {
        StateRequest { action, mask }
    }

    fn performed(commands: &[FrameCommand]) -> Vec<FrameAction> {
        commands
            .iter()
            .filter_map(|command| match command {
                FrameCommand::Perform(action) => Some(*action),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn toggling_maximize_on_minimized_window_restores_first() {
        let mut frame = SimulatedFrame::with_state(WindowState::MINIMIZED);
        let commands = reconcile(
            &mut frame,
            request(StateAction::Toggle, WindowState::MAXIMIZED_BOTH),
        );
        assert_eq!(
            performed(&commands),
            vec![FrameAction::Restore, FrameAction::Maximize]
        );
        assert_eq!(frame.state(), WindowState::MAXIMIZED_BOTH);
    }

    #[test]
    fn removing_fullscreen_and_inactive_axis_only_unfullscreens() {
        let mut frame = SimulatedFrame::with_state(WindowState::FULLSCREEN);
        let commands = reconcile(
            &mut frame,
            request(
                StateAction::Remove,
                WindowState::FULLSCREEN | WindowState::MAXIMIZED_HORZ,
            ),
        );
        assert_eq!(commands, vec![FrameCommand::Perform(FrameAction::Unfullscreen)]);
        assert_eq!(frame.state(), WindowState::empty());
    }

    #[test]
    fn entering_unmapped_state_drops_geometry_requests() {
        let mut frame = SimulatedFrame::default();
        let commands = reconcile(
            &mut frame,
            request(
                StateAction::Add,
                WindowState::ROLLED_UP | WindowState::HIDDEN | WindowState::FULLSCREEN,
            ),
        );
        assert_eq!(commands, vec![FrameCommand::Perform(FrameAction::Rollup)]);
        assert_eq!(frame.state(), WindowState::ROLLED_UP);
    }

    #[test]
    fn losing_one_axis_keeps_the_other() {
        let mut frame = SimulatedFrame::with_state(WindowState::MAXIMIZED_BOTH);
        let commands = reconcile(
            &mut frame,
            request(StateAction::Remove, WindowState::MAXIMIZED_HORZ),
        );
        assert_eq!(performed(&commands), vec![FrameAction::MaximizeVert]);
        assert_eq!(frame.state(), WindowState::MAXIMIZED_VERT);
    }

    #[test]
    fn losing_everything_active_is_a_single_restore() {
        let mut frame =
            SimulatedFrame::with_state(WindowState::MINIMIZED | WindowState::MAXIMIZED_VERT);
        let commands = reconcile(
            &mut frame,
            request(
                StateAction::Remove,
                WindowState::MINIMIZED | WindowState::MAXIMIZED_VERT,
            ),
        );
        assert_eq!(commands, vec![FrameCommand::Perform(FrameAction::Restore)]);
        assert_eq!(frame.state(), WindowState::empty());
    }

    #[test]
    fn unmapped_frames_drop_maximize_bits_silently() {
        let mut frame =
            SimulatedFrame::with_state(WindowState::HIDDEN | WindowState::MAXIMIZED_BOTH);
        let commands = reconcile(
            &mut frame,
            request(StateAction::Remove, WindowState::MAXIMIZED_VERT),
        );
        assert_eq!(
            commands,
            vec![FrameCommand::SetState {
                mask: WindowState::MAXIMIZED_VERT,
                gain: WindowState::empty(),
            }]
        );
        assert_eq!(
            frame.state(),
            WindowState::HIDDEN | WindowState::MAXIMIZED_HORZ
        );
    }

    #[test]
    fn leaving_unmapped_state_targets_the_active_reason() {
        let mut frame =
            SimulatedFrame::with_state(WindowState::ROLLED_UP | WindowState::MAXIMIZED_VERT);
        let commands = reconcile(&mut frame, request(StateAction::Remove, WindowState::ROLLED_UP));
        assert_eq!(performed(&commands), vec![FrameAction::Unrollup]);
        assert_eq!(frame.state(), WindowState::MAXIMIZED_VERT);

        let mut frame = SimulatedFrame::with_state(WindowState::empty());
        let commands = reconcile(&mut frame, request(StateAction::Toggle, WindowState::HIDDEN));
        assert_eq!(performed(&commands), vec![FrameAction::Hide]);
    }

    #[test]
    fn single_axis_gain_unions_with_current() {
        let mut frame = SimulatedFrame::with_state(WindowState::MAXIMIZED_VERT);
        let commands = reconcile(&mut frame, request(StateAction::Add, WindowState::MAXIMIZED_HORZ));
        assert_eq!(performed(&commands), vec![FrameAction::Maximize]);

        let mut frame = SimulatedFrame::default();
        let commands = reconcile(&mut frame, request(StateAction::Add, WindowState::MAXIMIZED_VERT));
        assert_eq!(performed(&commands), vec![FrameAction::MaximizeVert]);
    }

    #[test]
    fn fullscreen_wins_over_maximize() {
        let mut frame = SimulatedFrame::default();
        let commands = reconcile(
            &mut frame,
            request(StateAction::Add, WindowState::FULLSCREEN | WindowState::MAXIMIZED_BOTH),
        );
        assert_eq!(performed(&commands), vec![FrameAction::Fullscreen]);
        assert_eq!(frame.state(), WindowState::FULLSCREEN);
    }

    #[test]
    fn sticky_only_toggles_on_disagreement() {
        let mut frame = SimulatedFrame::with_state(WindowState::STICKY);
        assert!(reconcile(&mut frame, request(StateAction::Add, WindowState::STICKY)).is_empty());
        let commands = reconcile(&mut frame, request(StateAction::Toggle, WindowState::STICKY));
        assert_eq!(performed(&commands), vec![FrameAction::ToggleSticky]);
        assert!(!frame.state().contains(WindowState::STICKY));
    }

    #[test]
    fn above_and_below_together_cancel_out() {
        let mut frame = SimulatedFrame::default();
        let commands = reconcile(
            &mut frame,
            request(StateAction::Add, WindowState::ABOVE | WindowState::BELOW),
        );
        assert!(commands.is_empty());
        assert_eq!(frame.requested_layer(), Layer::NORMAL);
    }

    #[test]
    fn losing_a_layer_only_resets_the_matching_one() {
        let mut frame = SimulatedFrame::default();
        reconcile(&mut frame, request(StateAction::Add, WindowState::BELOW));
        assert_eq!(frame.requested_layer(), Layer::BELOW);

        // ABOVE is not active, so removing it does nothing.
        let commands = reconcile(&mut frame, request(StateAction::Remove, WindowState::ABOVE));
        assert!(commands.is_empty());

        let commands = reconcile(&mut frame, request(StateAction::Remove, WindowState::BELOW));
        assert_eq!(
            performed(&commands),
            vec![FrameAction::SetLayer(Layer::NORMAL)]
        );
    }

    #[test]
    fn urgency_uses_the_setter_and_leftovers_are_raw() {
        let mut frame = SimulatedFrame::default();
        let commands = reconcile(
            &mut frame,
            request(
                StateAction::Add,
                WindowState::URGENT | WindowState::SKIP_TASKBAR | WindowState::MODAL,
            ),
        );
        assert_eq!(
            commands,
            vec![
                FrameCommand::SetUrgency(true),
                FrameCommand::SetState {
                    mask: WindowState::SKIP_TASKBAR | WindowState::MODAL,
                    gain: WindowState::SKIP_TASKBAR | WindowState::MODAL,
                },
            ]
        );
        assert!(frame.urgency);
        assert!(frame.state().contains(WindowState::SKIP_TASKBAR | WindowState::MODAL));
    }
}
