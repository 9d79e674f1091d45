use serde::{Deserialize, Serialize};

/// Simulated hours since the case clock started. Not wall-clock time.
pub type Tick = u32;

/// Inclusive `[start, end]` window of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Tick,
    pub end: Tick,
}

impl TimeWindow {
    pub fn new(start: Tick, end: Tick) -> Self {
        Self { start, end }
    }

    pub fn at(tick: Tick) -> Self {
        Self::new(tick, tick)
    }

    /// `tick ± spread`, floored at zero.
    pub fn around(tick: Tick, spread: Tick) -> Self {
        Self::new(tick.saturating_sub(spread), tick.saturating_add(spread))
    }

    pub fn normalized(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self::new(self.end, self.start)
        }
    }

    pub fn width(&self) -> Tick {
        let window = self.normalized();
        window.end - window.start
    }

    pub fn contains(&self, tick: Tick) -> bool {
        let window = self.normalized();
        window.start <= tick && tick <= window.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        let left = self.normalized();
        let right = other.normalized();
        left.start <= right.end && right.start <= left.end
    }

    /// Latest start and earliest end over every window. `None` for an empty
    /// input. The result may be inverted (`start > end`) when the windows
    /// do not share a tick; callers check that themselves.
    pub fn intersect_all<'a, I>(windows: I) -> Option<(Tick, Tick)>
    where
        I: IntoIterator<Item = &'a TimeWindow>,
    {
        let mut bounds: Option<(Tick, Tick)> = None;
        for window in windows {
            let window = window.normalized();
            bounds = Some(match bounds {
                None => (window.start, window.end),
                Some((start, end)) => (start.max(window.start), end.min(window.end)),
            });
        }
        bounds
    }
}

/// 24h label for a tick, e.g. `21` -> `9pm`.
pub fn format_hour(tick: Tick) -> String {
    let value = tick % 24;
    let suffix = if value < 12 { "am" } else { "pm" };
    let display = match value % 12 {
        0 => 12,
        other => other,
    };
    format!("{}{}", display, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_floors_at_zero() {
        assert_eq!(TimeWindow::around(1, 3), TimeWindow::new(0, 4));
        assert_eq!(TimeWindow::around(20, 2).width(), 4);
    }

    #[test]
    fn overlap_and_contains() {
        let a = TimeWindow::new(18, 19);
        let b = TimeWindow::new(21, 22);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&TimeWindow::new(19, 25)));
        assert!(TimeWindow::new(22, 20).contains(21));
    }

    #[test]
    fn intersection_can_invert() {
        let windows = [TimeWindow::new(18, 19), TimeWindow::new(21, 22)];
        assert_eq!(TimeWindow::intersect_all(windows.iter()), Some((21, 19)));
        let empty: [TimeWindow; 0] = [];
        assert_eq!(TimeWindow::intersect_all(empty.iter()), None);
    }

    #[test]
    fn hours_read_naturally() {
        assert_eq!(format_hour(21), "9pm");
        assert_eq!(format_hour(24), "12am");
        assert_eq!(format_hour(12), "12pm");
    }
}
