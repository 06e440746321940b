//! Interactive dual-handle price range picker.
//!
//! One line redrawn in place: Left/Right move the active handle by one step,
//! Tab switches handles, Enter accepts, Esc dismisses. Dragging a handle past
//! its partner pushes the partner along rather than letting them cross.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::output;
use crate::cli::test_mode::{self, RangeKey};
use crate::wizard::range::{format_usd, RangeState};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handle {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy)]
struct WidgetState {
    lo: i64,
    hi: i64,
    min: i64,
    max: i64,
    active: Handle,
}

impl WidgetState {
    fn new(lo: i64, hi: i64, initial: RangeState) -> Self {
        WidgetState {
            lo,
            hi,
            min: initial.min.clamp(lo, hi),
            max: initial.max.clamp(lo, hi),
            active: Handle::Min,
        }
    }

    fn step(&self) -> i64 {
        ((self.hi - self.lo) / 100).max(1)
    }

    fn nudge(&mut self, delta: i64) {
        match self.active {
            Handle::Min => {
                self.min = (self.min + delta).clamp(self.lo, self.hi);
                if self.min > self.max {
                    self.max = self.min;
                }
            }
            Handle::Max => {
                self.max = (self.max + delta).clamp(self.lo, self.hi);
                if self.max < self.min {
                    self.min = self.max;
                }
            }
        }
    }

    fn switch(&mut self) {
        self.active = match self.active {
            Handle::Min => Handle::Max,
            Handle::Max => Handle::Min,
        };
    }

    fn range(&self) -> RangeState {
        RangeState {
            min: self.min,
            max: self.max,
        }
    }
}

/// Runs the widget. `Ok(None)` means the visitor dismissed it and the
/// current values stay as they were.
pub fn pick_range(
    label: &str,
    lo: i64,
    hi: i64,
    initial: RangeState,
) -> io::Result<Option<RangeState>> {
    if let Some(keys) = test_mode::next_range_events(label) {
        return Ok(run_scripted(label, lo, hi, initial, &keys));
    }

    let mut state = WidgetState::new(lo, hi, initial);
    let mut guard = RawModeGuard::activate()?;
    let mut stdout = io::stdout();

    loop {
        redraw(&mut stdout, label, &state)?;
        let event = event::read()?;
        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
                guard.deactivate();
                println!();
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            continue;
        }
        match key.code {
            KeyCode::Left => state.nudge(-state.step()),
            KeyCode::Right => state.nudge(state.step()),
            KeyCode::Tab => state.switch(),
            KeyCode::Enter => {
                guard.deactivate();
                println!();
                return Ok(Some(state.range()));
            }
            KeyCode::Esc => {
                guard.deactivate();
                println!();
                return Ok(None);
            }
            _ => {}
        }
    }
}

fn run_scripted(
    label: &str,
    lo: i64,
    hi: i64,
    initial: RangeState,
    keys: &[RangeKey],
) -> Option<RangeState> {
    let mut state = WidgetState::new(lo, hi, initial);
    for key in keys {
        match key {
            RangeKey::Left => state.nudge(-state.step()),
            RangeKey::Right => state.nudge(state.step()),
            RangeKey::Tab => state.switch(),
            RangeKey::Enter => {
                print_snapshot(label, &state);
                return Some(state.range());
            }
            RangeKey::Esc => {
                print_snapshot(label, &state);
                return None;
            }
        }
    }
    panic!("Scripted range events must end with ENTER or ESC for `{label}`");
}

fn print_snapshot(label: &str, state: &WidgetState) {
    output::info(format!(
        "{label}: {} - {}",
        format_usd(state.min),
        format_usd(state.max)
    ));
}

fn redraw(stdout: &mut Stdout, label: &str, state: &WidgetState) -> io::Result<()> {
    let plain = output::current_preferences().plain_mode;
    let (filled, empty) = if plain { ('#', '-') } else { ('█', '─') };

    let span = (state.hi - state.lo).max(1) as f64;
    let cell = |value: i64| -> usize {
        let pct = (value - state.lo) as f64 / span;
        (pct * (BAR_WIDTH - 1) as f64).round() as usize
    };
    let left = cell(state.min);
    let right = cell(state.max);

    let bar: String = (0..BAR_WIDTH)
        .map(|index| {
            if index >= left && index <= right {
                filled
            } else {
                empty
            }
        })
        .collect();

    let handle = match state.active {
        Handle::Min => "Min",
        Handle::Max => "Max",
    };

    stdout.execute(cursor::MoveToColumn(0))?;
    stdout.execute(terminal::Clear(ClearType::CurrentLine))?;
    write!(
        stdout,
        "{label}: {} [{bar}] {}  (adjusting {handle})",
        format_usd(state.min),
        format_usd(state.max)
    )?;
    stdout.flush()
}

struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    fn activate() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    fn deactivate(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
            self.active = false;
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.deactivate();
    }
}
