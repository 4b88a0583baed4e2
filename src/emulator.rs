use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::chip8::Chip8;
use crate::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::error::{LoadError, StepError};
use crate::state::NUM_KEYS;

pub const DEFAULT_FRAME_RATE: u64 = 60;
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u64 = 700;

pub struct Settings {
    pub frame_rate: u64,
    pub ips: u64,
    pub rom: PathBuf,
}

/// Terminal front-end. Owns the VM and drives its two entry points: timers
/// tick once per rendered frame, instructions run at the configured rate in
/// between.
pub struct Emulator {
    vm: Chip8,
    settings: Settings,
}

/// Maps the left-hand block of a QWERTY keyboard onto the hex keypad:
///
/// ```text
/// 1 2 3 4        1 2 3 C
/// q w e r   ->   4 5 6 D
/// a s d f        7 8 9 E
/// z x c v        A 0 B F
/// ```
fn key_index(c: char) -> Option<usize> {
    match c {
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        '4' => Some(0xC),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'r' => Some(0xD),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'f' => Some(0xE),
        'z' => Some(0xA),
        'x' => Some(0x0),
        'c' => Some(0xB),
        'v' => Some(0xF),
        _ => None,
    }
}

/// Reads a ROM image from disk, reporting failure as [LoadError::Io].
fn read_rom(path: &Path) -> Result<Vec<u8>, LoadError> {
    Ok(std::fs::read(path)?)
}

impl Emulator {
    pub fn new(settings: Settings) -> Self {
        Emulator {
            vm: Chip8::new(),
            settings,
        }
    }

    fn draw_frame(&self, frame: &mut ratatui::Frame, rom_name: &str) {
        let mut row_string = String::with_capacity(DISPLAY_WIDTH * DISPLAY_HEIGHT + DISPLAY_HEIGHT);
        for row_idx in 0..DISPLAY_HEIGHT {
            for col_idx in 0..DISPLAY_WIDTH {
                row_string.push(if self.vm.frame().pixel(col_idx, row_idx) {
                    '█'
                } else {
                    ' '
                });
            }
            row_string.push('\n');
        }
        let paragraph = Paragraph::new(row_string)
            .block(Block::default().borders(Borders::ALL).title(rom_name))
            .style(Style::default().fg(Color::White));
        frame.render_widget(paragraph, frame.area());
    }

    /// Runs one frame's worth of instructions. Unknown opcodes are skipped
    /// with a warning; stack faults abort emulation.
    fn run_instructions(&mut self, count: u64) -> anyhow::Result<()> {
        for _ in 0..count {
            match self.vm.step() {
                Ok(()) => {}
                Err(StepError::Decode(err)) => {
                    log::warn!("{err}, skipping");
                    self.vm.skip();
                }
                Err(err) => return Err(err).context("emulation halted"),
            }
        }
        Ok(())
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.settings.frame_rate as f64);
        let instructions_per_frame = (self.settings.ips / self.settings.frame_rate).max(1);
        let rom_stem: String = self
            .settings
            .rom
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown ROM".to_string());

        let rom_data = read_rom(&self.settings.rom)
            .with_context(|| format!("failed to read {}", self.settings.rom.display()))?;
        self.vm.load(&rom_data)?;
        log::info!("loaded {} ({} bytes)", rom_stem, rom_data.len());

        enable_raw_mode()?;
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        'mainloop: loop {
            let frame_start = Instant::now();

            self.vm.tick_timers();
            self.run_instructions(instructions_per_frame)?;

            if self.vm.frame().is_dirty() {
                terminal.draw(|frame| self.draw_frame(frame, &rom_stem))?;
                self.vm.clear_frame_flag();
            }

            // Crossterm delivers no release events in plain raw mode, so
            // keys are held for one frame and dropped at the boundary.
            for key in 0..NUM_KEYS {
                self.vm.set_key(key, false);
            }
            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Esc => {
                            terminal.clear()?;
                            break 'mainloop;
                        }
                        KeyCode::Char(c) => {
                            if let Some(index) = key_index(c) {
                                self.vm.set_key(index, true);
                            }
                        }
                        _ => {}
                    }
                }
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
        disable_raw_mode()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rom_surfaces_io_error() {
        let err = read_rom(Path::new("/nonexistent/rom.ch8")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
