#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Fire,
    Modifier,
    ResetBody,
    ToggleMode,
    Save,
    Load,
    Restart,
    Quit,
}

const ACTION_COUNT: usize = 11;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Fire,
        InputAction::Modifier,
        InputAction::ResetBody,
        InputAction::ToggleMode,
        InputAction::Save,
        InputAction::Load,
        InputAction::Restart,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Fire => 3,
            InputAction::Modifier => 4,
            InputAction::ResetBody => 5,
            InputAction::ToggleMode => 6,
            InputAction::Save => 7,
            InputAction::Load => 8,
            InputAction::Restart => 9,
            InputAction::Quit => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Pan,
}

const POINTER_BUTTON_COUNT: usize = 3;

impl PointerButton {
    const fn index(self) -> usize {
        match self {
            PointerButton::Primary => 0,
            PointerButton::Secondary => 1,
            PointerButton::Pan => 2,
        }
    }
}

/// Held state plus the press edge of a fixed set of buttons.
///
/// A press edge survives a release in the same tick so short taps are not lost.
#[derive(Debug, Clone, Copy)]
struct ButtonStates<const N: usize> {
    down: [bool; N],
    pressed: [bool; N],
}

impl<const N: usize> Default for ButtonStates<N> {
    fn default() -> Self {
        Self {
            down: [false; N],
            pressed: [false; N],
        }
    }
}

impl<const N: usize> ButtonStates<N> {
    fn set_down(&mut self, index: usize, is_down: bool) {
        self.down[index] = is_down;
    }

    fn set_pressed(&mut self, index: usize, pressed: bool) {
        self.pressed[index] = pressed;
        if pressed {
            self.down[index] = true;
        }
    }

    fn clear_edges(&mut self) {
        self.pressed = [false; N];
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    buttons: ButtonStates<ACTION_COUNT>,
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.buttons.set_down(action.index(), is_down);
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction, pressed: bool) {
        self.buttons.set_pressed(action.index(), pressed);
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.buttons.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.buttons.pressed[action.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.buttons.clear_edges();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PointerStates {
    buttons: ButtonStates<POINTER_BUTTON_COUNT>,
}

impl PointerStates {
    pub(crate) fn set(&mut self, button: PointerButton, is_down: bool) {
        self.buttons.set_down(button.index(), is_down);
    }

    pub(crate) fn set_pressed(&mut self, button: PointerButton, pressed: bool) {
        self.buttons.set_pressed(button.index(), pressed);
    }

    pub(crate) fn is_down(&self, button: PointerButton) -> bool {
        self.buttons.down[button.index()]
    }

    pub(crate) fn was_pressed(&self, button: PointerButton) -> bool {
        self.buttons.pressed[button.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.buttons.clear_edges();
    }
}
