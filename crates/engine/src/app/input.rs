use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    UseTool,
    SwitchTool,
    CycleSeed,
    Plant,
    Harvest,
    Sleep,
    Quit,
}

const ACTION_COUNT: usize = 11;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Records a key transition; a press while already held is not a new edge.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::UseTool => 4,
            InputAction::SwitchTool => 5,
            InputAction::CycleSeed => 6,
            InputAction::Plant => 7,
            InputAction::Harvest => 8,
            InputAction::Sleep => 9,
            InputAction::Quit => 10,
        }
    }
}

/// Input state for one simulation tick. Held keys report through `is_down`;
/// discrete actions through `just_pressed`, which is true for exactly one tick
/// per physical press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            window_width,
            window_height,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.actions.just_pressed(action)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Unnormalised movement intent from the held direction keys; opposing
    /// keys cancel.
    pub fn movement(&self) -> Vec2 {
        let axis = |negative, positive| {
            (self.is_down(positive) as i32 - self.is_down(negative) as i32) as f32
        };
        Vec2::new(
            axis(InputAction::MoveLeft, InputAction::MoveRight),
            axis(InputAction::MoveUp, InputAction::MoveDown),
        )
    }

    pub fn with_action_down(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.actions.pressed[action.index()] = false;
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_reports_one_press_edge() {
        let mut states = ActionStates::default();
        states.set(InputAction::UseTool, true);
        assert!(states.just_pressed(InputAction::UseTool));
        states.clear_edges();
        states.set(InputAction::UseTool, true);
        assert!(!states.just_pressed(InputAction::UseTool));
        assert!(states.is_down(InputAction::UseTool));
    }

    #[test]
    fn movement_cancels_opposing_keys() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft)
            .with_action_down(InputAction::MoveRight)
            .with_action_down(InputAction::MoveDown);
        assert_eq!(snapshot.movement(), Vec2::new(0.0, 1.0));
        assert!(!snapshot.just_pressed(InputAction::MoveDown));
    }
}
