use std::time::Duration;

use crate::input::{ButtonEvent, ControllerButton, NavAction};

/// Delay before a held direction starts repeating.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(300);
/// Interval between synthesized repeats once started.
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(120);

/// Auto-repeat for held directional buttons.
///
/// Clock-free: callers supply `now` as a monotonically non-decreasing
/// duration since shell start. The first press is delivered by the caller
/// itself; the repeater only synthesizes the follow-up presses. Any button
/// release disarms it, matching how a d-pad scroll should stop the moment
/// the thumb lifts.
#[derive(Debug)]
pub struct HoldRepeater {
    initial_delay: Duration,
    interval: Duration,
    held: Option<Held>,
}

#[derive(Debug)]
struct Held {
    button: ControllerButton,
    pressed_at: Duration,
    last_repeat: Option<Duration>,
}

impl HoldRepeater {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            held: None,
        }
    }

    /// Feed a real transition through the repeater.
    ///
    /// Directional presses arm it; duplicate press reports for the button
    /// already held do not re-arm (the transport may echo held buttons).
    pub fn observe(&mut self, event: ButtonEvent, now: Duration) {
        if !event.pressed {
            self.held = None;
            return;
        }
        if !NavAction::from(event.button).is_directional() {
            return;
        }
        if self
            .held
            .as_ref()
            .is_some_and(|held| held.button == event.button)
        {
            return;
        }
        self.held = Some(Held {
            button: event.button,
            pressed_at: now,
            last_repeat: None,
        });
    }

    /// Synthesize the next repeat press if one is due.
    pub fn poll(&mut self, now: Duration) -> Option<ButtonEvent> {
        let held = self.held.as_mut()?;
        let due = match held.last_repeat {
            None => held.pressed_at + self.initial_delay,
            Some(last) => last + self.interval,
        };
        if now < due {
            return None;
        }
        held.last_repeat = Some(now);
        Some(ButtonEvent::press(held.button))
    }

    /// Disarm without a release, e.g. when the cursor hits a grid boundary.
    pub fn cancel(&mut self) {
        self.held = None;
    }

    pub fn is_armed(&self) -> bool {
        self.held.is_some()
    }
}

impl Default for HoldRepeater {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_REPEAT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn no_repeat_before_initial_delay() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Down), ms(0));
        assert!(repeater.poll(ms(100)).is_none());
        assert!(repeater.poll(ms(299)).is_none());
    }

    #[test]
    fn repeats_on_interval_after_delay() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Down), ms(0));
        assert_eq!(
            repeater.poll(ms(300)),
            Some(ButtonEvent::press(ControllerButton::Down))
        );
        assert!(repeater.poll(ms(350)).is_none());
        assert_eq!(
            repeater.poll(ms(420)),
            Some(ButtonEvent::press(ControllerButton::Down))
        );
    }

    #[test]
    fn any_release_disarms() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Right), ms(0));
        repeater.observe(ButtonEvent::release(ControllerButton::A), ms(50));
        assert!(!repeater.is_armed());
        assert!(repeater.poll(ms(1000)).is_none());
    }

    #[test]
    fn non_directional_presses_do_not_arm() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::A), ms(0));
        repeater.observe(ButtonEvent::press(ControllerButton::Start), ms(0));
        assert!(!repeater.is_armed());
    }

    #[test]
    fn duplicate_press_keeps_original_cadence() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Up), ms(0));
        repeater.observe(ButtonEvent::press(ControllerButton::Up), ms(250));
        // Had the duplicate re-armed, nothing would be due until 550.
        assert!(repeater.poll(ms(300)).is_some());
    }

    #[test]
    fn cancel_stops_a_hold() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Left), ms(0));
        repeater.cancel();
        assert!(repeater.poll(ms(1000)).is_none());
    }

    #[test]
    fn new_direction_replaces_the_hold() {
        let mut repeater = HoldRepeater::default();
        repeater.observe(ButtonEvent::press(ControllerButton::Up), ms(0));
        repeater.observe(ButtonEvent::press(ControllerButton::Down), ms(100));
        assert!(repeater.poll(ms(350)).is_none());
        assert_eq!(
            repeater.poll(ms(400)),
            Some(ButtonEvent::press(ControllerButton::Down))
        );
    }
}
