//! Input sources turned into per-frame intents
//!
//! The keyboard and mouse wheel arrive as SDL events. The steering wheel is
//! an SDL joystick that may be unplugged at any time; it is polled each
//! frame and, while absent, reopened at most once per reconnect interval.

use crate::config::{InputConfig, WheelMode};
use crate::display::InputEvent;
use crate::plot::Direction;
use sdl2::joystick::Joystick;
use sdl2::keyboard::Keycode;
use sdl2::JoystickSubsystem;
use std::time::{Duration, Instant};

/// What the visitor asked for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Move(Direction),
    /// Absolute position in [-1, 1]; -1 is the top of the y range
    SetLevel(f64),
    ToggleStats,
    Quit,
}

/// Keyboard and mouse wheel state
#[derive(Debug, Default)]
pub struct Controls {
    up_held: bool,
    down_held: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one event. Key presses only update held state here; the
    /// resulting moves come from [`held_intents`](Self::held_intents).
    pub fn handle(&mut self, event: &InputEvent, intents: &mut Vec<Intent>) {
        match event {
            InputEvent::Quit => intents.push(Intent::Quit),
            InputEvent::KeyDown(key) => match *key {
                Keycode::Escape => intents.push(Intent::Quit),
                Keycode::F => intents.push(Intent::ToggleStats),
                Keycode::Up | Keycode::W => self.up_held = true,
                Keycode::Down | Keycode::S => self.down_held = true,
                _ => {},
            },
            InputEvent::KeyUp(key) => match *key {
                Keycode::Up | Keycode::W => self.up_held = false,
                Keycode::Down | Keycode::S => self.down_held = false,
                _ => {},
            },
            InputEvent::Wheel(notches) => {
                let dir = if *notches > 0 { Direction::Up } else { Direction::Down };
                for _ in 0..notches.unsigned_abs() {
                    intents.push(Intent::Move(dir));
                }
            },
            InputEvent::JoystickAdded | InputEvent::JoystickRemoved(_) => {},
        }
    }

    /// One move per held arrow key
    pub fn held_intents(&self, intents: &mut Vec<Intent>) {
        if self.up_held {
            intents.push(Intent::Move(Direction::Up));
        }
        if self.down_held {
            intents.push(Intent::Move(Direction::Down));
        }
    }
}

/// Rate limit for reconnect attempts
#[derive(Debug)]
pub struct ReconnectTimer {
    interval: Duration,
    last_attempt: Option<Instant>,
}

impl ReconnectTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
        }
    }

    /// True at most once per interval; marks the attempt when it returns true
    pub fn due(&mut self, now: Instant) -> bool {
        let due = self
            .last_attempt
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_attempt = Some(now);
        }
        due
    }

    /// Allow the next call to `due` to fire immediately
    pub fn expire(&mut self) {
        self.last_attempt = None;
    }
}

/// Axis reading to intent. Negative deflection is up unless inverted.
pub fn axis_intent(value: f32, config: &InputConfig) -> Option<Intent> {
    let value = if config.invert { -value } else { value };
    let value = value.clamp(-1.0, 1.0);
    let centered = value.abs() < config.dead_zone;
    match config.mode {
        WheelMode::Discrete if centered => None,
        WheelMode::Discrete if value < 0.0 => Some(Intent::Move(Direction::Up)),
        WheelMode::Discrete => Some(Intent::Move(Direction::Down)),
        WheelMode::Absolute if centered => Some(Intent::SetLevel(0.0)),
        WheelMode::Absolute => Some(Intent::SetLevel(value as f64)),
    }
}

/// The steering wheel, if one is plugged in
pub struct WheelInput {
    config: InputConfig,
    device: Option<Joystick>,
    timer: ReconnectTimer,
}

impl WheelInput {
    pub fn new(config: InputConfig) -> Self {
        let interval = Duration::from_millis(config.reconnect_interval_ms);
        Self {
            config,
            device: None,
            timer: ReconnectTimer::new(interval),
        }
    }

    /// Open the configured joystick. Failure is logged and leaves the wheel absent.
    pub fn try_connect(&mut self, subsystem: &JoystickSubsystem) -> bool {
        let index = self.config.joystick_index;
        let available = match subsystem.num_joysticks() {
            Ok(n) => n,
            Err(e) => {
                log::warn!("joystick enumeration failed: {}", e);
                return false;
            },
        };
        if index >= available {
            log::debug!("no joystick at index {} ({} present)", index, available);
            return false;
        }
        match subsystem.open(index) {
            Ok(js) => {
                log::info!(
                    "wheel connected: {} ({} axes)",
                    js.name(),
                    js.num_axes()
                );
                self.device = Some(js);
                true
            },
            Err(e) => {
                log::warn!("failed to open joystick {}: {}", index, e);
                false
            },
        }
    }

    /// Reconnect if absent and the retry interval has passed
    pub fn maintain(&mut self, subsystem: &JoystickSubsystem, now: Instant) {
        if self.device.is_none() && self.timer.due(now) {
            self.try_connect(subsystem);
        }
    }

    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::JoystickAdded => self.timer.expire(),
            InputEvent::JoystickRemoved(id) => {
                if self.device.as_ref().is_some_and(|js| js.instance_id() == *id) {
                    log::warn!("wheel disconnected, will retry");
                    self.device = None;
                    self.timer.expire();
                }
            },
            _ => {},
        }
    }

    /// Axis position in [-1, 1], None while disconnected
    pub fn read_value(&mut self) -> Option<f32> {
        let device = self.device.as_ref()?;
        match device.axis(self.config.axis) {
            Ok(raw) => Some((raw as f32 / i16::MAX as f32).clamp(-1.0, 1.0)),
            Err(e) => {
                log::warn!("wheel read failed, dropping device: {}", e);
                self.device = None;
                None
            },
        }
    }

    pub fn intent(&mut self) -> Option<Intent> {
        let value = self.read_value()?;
        axis_intent(value, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(controls: &mut Controls, events: &[InputEvent]) -> Vec<Intent> {
        let mut intents = Vec::new();
        for e in events {
            controls.handle(e, &mut intents);
        }
        controls.held_intents(&mut intents);
        intents
    }

    #[test]
    fn test_quit_sources() {
        let mut c = Controls::new();
        assert_eq!(collect(&mut c, &[InputEvent::Quit]), vec![Intent::Quit]);
        assert_eq!(
            collect(&mut c, &[InputEvent::KeyDown(Keycode::Escape)]),
            vec![Intent::Quit]
        );
    }

    #[test]
    fn test_held_keys_repeat_each_frame() {
        let mut c = Controls::new();
        let up = Intent::Move(Direction::Up);
        assert_eq!(collect(&mut c, &[InputEvent::KeyDown(Keycode::Up)]), vec![up]);
        assert_eq!(collect(&mut c, &[]), vec![up]);
        assert!(collect(&mut c, &[InputEvent::KeyUp(Keycode::Up)]).is_empty());
        assert_eq!(
            collect(&mut c, &[InputEvent::KeyDown(Keycode::S)]),
            vec![Intent::Move(Direction::Down)]
        );
    }

    #[test]
    fn test_wheel_notches() {
        let mut c = Controls::new();
        assert_eq!(
            collect(&mut c, &[InputEvent::Wheel(2)]),
            vec![Intent::Move(Direction::Up); 2]
        );
        assert_eq!(
            collect(&mut c, &[InputEvent::Wheel(-3)]),
            vec![Intent::Move(Direction::Down); 3]
        );
    }

    #[test]
    fn test_axis_discrete() {
        let config = InputConfig::default();
        assert_eq!(axis_intent(0.1, &config), None);
        assert_eq!(axis_intent(-0.1, &config), None);
        assert_eq!(axis_intent(-0.5, &config), Some(Intent::Move(Direction::Up)));
        assert_eq!(axis_intent(0.9, &config), Some(Intent::Move(Direction::Down)));

        let inverted = InputConfig {
            invert: true,
            ..InputConfig::default()
        };
        assert_eq!(axis_intent(0.9, &inverted), Some(Intent::Move(Direction::Up)));
    }

    #[test]
    fn test_axis_absolute() {
        let config = InputConfig {
            mode: WheelMode::Absolute,
            ..InputConfig::default()
        };
        assert_eq!(axis_intent(0.05, &config), Some(Intent::SetLevel(0.0)));
        assert_eq!(axis_intent(-1.0, &config), Some(Intent::SetLevel(-1.0)));
        assert_eq!(axis_intent(3.0, &config), Some(Intent::SetLevel(1.0)));
    }

    #[test]
    fn test_reconnect_timer() {
        let mut timer = ReconnectTimer::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(timer.due(t0));
        assert!(!timer.due(t0 + Duration::from_millis(500)));
        assert!(timer.due(t0 + Duration::from_millis(1000)));
        assert!(!timer.due(t0 + Duration::from_millis(1200)));
        timer.expire();
        assert!(timer.due(t0 + Duration::from_millis(1300)));
    }
}
