#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
}

const ACTION_COUNT: usize = 6;

/// Query surface of the input collaborator.
pub trait InputSource {
    fn is_held(&self, action: InputAction) -> bool;
    fn just_pressed(&self, action: InputAction) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Dash,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::Dash => 5,
        }
    }
}

/// Input state for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_held(mut self, action: InputAction, is_held: bool) -> Self {
        self.held.set(action, is_held);
        if !is_held {
            self.pressed.set(action, false);
        }
        self
    }

    /// Marks a press edge for this tick; a pressed action is also held.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.held.set(action, true);
        self.pressed.set(action, true);
        self
    }
}

impl InputSource for InputSnapshot {
    fn is_held(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }
}

/// Turns raw held states into per-tick snapshots with press edges. A held
/// action only reports `just_pressed` on the first tick after going down.
#[derive(Debug, Default)]
pub struct InputCollector {
    current: ActionStates,
    previous: ActionStates,
}

impl InputCollector {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.current.set(action, is_down);
    }

    pub fn release_all(&mut self) {
        self.current = ActionStates::default();
    }

    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty();
        for action in InputAction::ALL {
            let down = self.current.is_down(action);
            snapshot.held.set(action, down);
            snapshot
                .pressed
                .set(action, down && !self.previous.is_down(action));
        }
        self.previous = self.current;
        snapshot
    }
}
