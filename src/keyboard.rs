use minifb::Key;

pub const KEY_COUNT: usize = 16;

/// The 16-key hex keypad, keys 0x0-0xF. Host events flow in through
/// `Machine::set_key`; EX9E/EXA1/FX0A read it.
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.keys[key as usize] = pressed;
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[key as usize]
    }
}

/// QWERTY mapping for the 4x4 pad:
///
/// ```text
/// 1 2 3 4        1 2 3 C
/// q w e r   ->   4 5 6 D
/// a s d f        7 8 9 E
/// z x c v        A 0 B F
/// ```
pub fn map_key(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

/// Collapses the host's currently-down key list into keypad state.
pub fn poll(keys: impl IntoIterator<Item = Key>) -> [bool; KEY_COUNT] {
    let mut down = [false; KEY_COUNT];
    for key in keys {
        if let Some(num) = map_key(key) {
            down[num as usize] = true;
        }
    }
    down
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut pad = Keypad::new();
        pad.set(0xA, true);
        assert!(pad.is_pressed(0xA));
        pad.set(0xA, false);
        assert!(!pad.is_pressed(0xA));
    }

    #[test]
    fn qwerty_rows_map_to_pad_columns() {
        assert_eq!(map_key(Key::Key1), Some(0x1));
        assert_eq!(map_key(Key::Key4), Some(0xC));
        assert_eq!(map_key(Key::X), Some(0x0));
        assert_eq!(map_key(Key::V), Some(0xF));
        assert_eq!(map_key(Key::Enter), None);
    }

    #[test]
    fn poll_collapses_to_keypad_numbers() {
        let down = poll([Key::Q, Key::V, Key::Space]);
        assert!(down[0x4]);
        assert!(down[0xF]);
        assert_eq!(down.iter().filter(|&&d| d).count(), 2);
    }
}
