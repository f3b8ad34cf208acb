use minifb::{Key, Scale, Window, WindowOptions};

use crate::framebuffer::{FrameBuffer, HEIGHT, WIDTH};

const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

// phosphor green on a dark tube
const PIXEL_ON: u32 = rgb(0x00, 0xFF, 0x00);
const PIXEL_OFF: u32 = rgb(0x00, 0x11, 0x00);

/// Rendering collaborator: a minifb window scaled 16x. Pulls the
/// framebuffer when the core reports a redraw; color mapping lives here,
/// not in the core.
pub struct Screen {
    buffer: Vec<u32>,
    window: Window,
}

impl Screen {
    pub fn open() -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "chipvm - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale: Scale::X16,
                ..WindowOptions::default()
            },
        )?;
        // ~60 fps; this limiter also paces the emulation loop
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
        Ok(Self {
            buffer: vec![PIXEL_OFF; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Host keys currently held down.
    pub fn keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }

    pub fn rasterize(&mut self, fb: &FrameBuffer) {
        for (dst, cell) in self.buffer.iter_mut().zip(fb.cells()) {
            *dst = if *cell == 1 { PIXEL_ON } else { PIXEL_OFF };
        }
    }

    pub fn present(&mut self) -> Result<(), minifb::Error> {
        self.window.update_with_buffer(&self.buffer, WIDTH, HEIGHT)
    }
}
