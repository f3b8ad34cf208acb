use std::{env, error::Error, process};

use log::info;

use chipvm::display::Screen;
use chipvm::keyboard::{self, KEY_COUNT};
use chipvm::machine::{Machine, Options};
use chipvm::sound::Sound;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: chipvm <rom>");
            process::exit(1);
        }
    };
    let mut machine = Machine::new(Options::default());
    machine.load_rom_file(&path)?;
    info!("running {path}");

    let mut screen = Screen::open()?;
    let sound = Sound::new();

    // One iteration per ~1/60 s (the window's update-rate limiter paces
    // us): key edges in, a batch of instructions, one timer tick, then
    // video and audio out. The machine is only ever touched from here.
    let batch = machine.options().instructions_per_tick;
    let mut held = [false; KEY_COUNT];
    while screen.is_open() {
        let down = keyboard::poll(screen.keys());
        for key in 0..KEY_COUNT {
            if down[key] != held[key] {
                machine.set_key(key as u8, down[key]);
            }
        }
        held = down;

        for _ in 0..batch {
            machine.step();
        }
        let beep = machine.tick_timers();

        if machine.take_draw_flag() {
            screen.rasterize(machine.framebuffer());
        }
        screen.present()?;
        sound.set_active(beep);
    }
    Ok(())
}
