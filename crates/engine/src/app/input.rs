use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Quit,
    Escape,
}

const KEY_COUNT: usize = 7;

impl InputKey {
    pub const ALL: [InputKey; KEY_COUNT] = [
        InputKey::Left,
        InputKey::Right,
        InputKey::Up,
        InputKey::Down,
        InputKey::Jump,
        InputKey::Quit,
        InputKey::Escape,
    ];

    const fn index(self) -> usize {
        match self {
            InputKey::Left => 0,
            InputKey::Right => 1,
            InputKey::Up => 2,
            InputKey::Down => 3,
            InputKey::Jump => 4,
            InputKey::Quit => 5,
            InputKey::Escape => 6,
        }
    }

    pub fn from_physical_key(key: PhysicalKey) -> Option<Self> {
        match key {
            PhysicalKey::Code(KeyCode::ArrowLeft) => Some(InputKey::Left),
            PhysicalKey::Code(KeyCode::ArrowRight) => Some(InputKey::Right),
            PhysicalKey::Code(KeyCode::ArrowUp) => Some(InputKey::Up),
            PhysicalKey::Code(KeyCode::ArrowDown) => Some(InputKey::Down),
            PhysicalKey::Code(KeyCode::KeyZ) => Some(InputKey::Jump),
            PhysicalKey::Code(KeyCode::KeyQ) => Some(InputKey::Quit),
            PhysicalKey::Code(KeyCode::Escape) => Some(InputKey::Escape),
            _ => None,
        }
    }
}

/// Per-frame key edges on top of persistent held state.
///
/// `pressed`/`released` only describe transitions recorded since the last
/// [`KeyboardState::begin_frame`]; `held` survives across frames until the raw
/// signal changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardState {
    held: [bool; KEY_COUNT],
    pressed: [bool; KEY_COUNT],
    released: [bool; KEY_COUNT],
}

impl KeyboardState {
    pub fn begin_frame(&mut self) {
        self.pressed = [false; KEY_COUNT];
        self.released = [false; KEY_COUNT];
    }

    pub fn record_key_down(&mut self, key: InputKey) {
        let index = key.index();
        if !self.held[index] {
            self.pressed[index] = true;
        }
        self.held[index] = true;
    }

    pub fn record_key_up(&mut self, key: InputKey) {
        let index = key.index();
        if self.held[index] {
            self.released[index] = true;
        }
        self.held[index] = false;
    }

    pub fn record(&mut self, key: InputKey, is_down: bool) {
        if is_down {
            self.record_key_down(key);
        } else {
            self.record_key_up(key);
        }
    }

    pub fn is_held(&self, key: InputKey) -> bool {
        self.held[key.index()]
    }

    pub fn was_pressed(&self, key: InputKey) -> bool {
        self.pressed[key.index()]
    }

    pub fn was_released(&self, key: InputKey) -> bool {
        self.released[key.index()]
    }

    /// Either quit key went down this frame.
    pub fn quit_pressed(&self) -> bool {
        self.was_pressed(InputKey::Quit) || self.was_pressed(InputKey::Escape)
    }
}
