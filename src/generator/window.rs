//! Day windows: the contiguous day ranges handled by one model call

use std::fmt;

/// Inclusive, 1-based range of trip days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: u32,
    pub end: u32,
}

impl DayWindow {
    /// Number of days covered
    #[must_use]
    pub fn len(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Day numbers in order
    pub fn days(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Split `day_count` days into consecutive windows of at most `chunk_size` days
#[must_use]
pub fn plan_windows(day_count: u32, chunk_size: u32) -> Vec<DayWindow> {
    let chunk_size = chunk_size.max(1);
    (1..=day_count)
        .step_by(chunk_size as usize)
        .map(|start| DayWindow {
            start,
            end: start.saturating_add(chunk_size - 1).min(day_count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 7, vec![(1, 1)])]
    #[case(5, 7, vec![(1, 5)])]
    #[case(7, 7, vec![(1, 7)])]
    #[case(10, 7, vec![(1, 7), (8, 10)])]
    #[case(21, 7, vec![(1, 7), (8, 14), (15, 21)])]
    #[case(3, 1, vec![(1, 1), (2, 2), (3, 3)])]
    #[case(0, 7, vec![])]
    #[case(3, u32::MAX, vec![(1, 3)])]
    #[case(21, u32::MAX, vec![(1, 21)])]
    fn test_plan_windows(#[case] days: u32, #[case] chunk: u32, #[case] expected: Vec<(u32, u32)>) {
        let windows: Vec<(u32, u32)> = plan_windows(days, chunk)
            .into_iter()
            .map(|w| (w.start, w.end))
            .collect();
        assert_eq!(windows, expected);
    }

    #[test]
    fn test_zero_chunk_size_is_treated_as_one() {
        assert_eq!(plan_windows(2, 0).len(), 2);
    }

    #[test]
    fn test_window_display_and_len() {
        let window = DayWindow { start: 8, end: 10 };
        assert_eq!(window.to_string(), "8-10");
        assert_eq!(window.len(), 3);
        assert_eq!(window.days().collect::<Vec<_>>(), vec![8, 9, 10]);
    }
}
