// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Statistics collected during a hybrid solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Number of tours accepted by the exact search portfolio.
    pub solutions_found: u64,
    /// Number of threads used, refiner included.
    pub used_threads: usize,
    /// Number of connection masks published to the refiner.
    pub masks_published: u64,
    /// Number of completed evolutionary passes.
    pub refiner_passes: u64,
    /// Total duration of the solve.
    pub solve_duration: std::time::Duration,
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Solutions Found: {}", self.solutions_found)?;
        writeln!(f, "  Used Threads: {}", self.used_threads)?;
        writeln!(f, "  Masks Published: {}", self.masks_published)?;
        writeln!(f, "  Refiner Passes: {}", self.refiner_passes)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatisticsBuilder {
    solutions_found: u64,
    used_threads: usize,
    masks_published: u64,
    refiner_passes: u64,
    solve_duration: std::time::Duration,
}

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    /// Creates a new `SolverStatisticsBuilder` with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            solutions_found: 0,
            used_threads: 1,
            masks_published: 0,
            refiner_passes: 0,
            solve_duration: std::time::Duration::ZERO,
        }
    }

    /// Sets the number of solutions found.
    #[inline]
    pub fn solutions_found(mut self, solutions_found: u64) -> Self {
        self.solutions_found = solutions_found;
        self
    }

    /// Sets the number of threads used.
    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.used_threads = used_threads;
        self
    }

    /// Sets the number of published masks.
    #[inline]
    pub fn masks_published(mut self, masks_published: u64) -> Self {
        self.masks_published = masks_published;
        self
    }

    /// Sets the number of completed refiner passes.
    #[inline]
    pub fn refiner_passes(mut self, refiner_passes: u64) -> Self {
        self.refiner_passes = refiner_passes;
        self
    }

    /// Sets the total solve duration.
    #[inline]
    pub fn solve_duration(mut self, solve_duration: std::time::Duration) -> Self {
        self.solve_duration = solve_duration;
        self
    }

    /// Builds the `SolverStatistics` instance.
    #[inline]
    pub fn build(self) -> SolverStatistics {
        SolverStatistics {
            solutions_found: self.solutions_found,
            used_threads: self.used_threads,
            masks_published: self.masks_published,
            refiner_passes: self.refiner_passes,
            solve_duration: self.solve_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolverStatistics;
    use super::SolverStatisticsBuilder;
    use std::time::Duration;

    #[test]
    fn test_builder_constructs_expected_struct() {
        let stats = SolverStatisticsBuilder::new()
            .solutions_found(3)
            .used_threads(6)
            .masks_published(12)
            .refiner_passes(2)
            .solve_duration(Duration::from_millis(1234))
            .build();

        assert_eq!(stats.solutions_found, 3);
        assert_eq!(stats.used_threads, 6);
        assert_eq!(stats.masks_published, 12);
        assert_eq!(stats.refiner_passes, 2);
        assert_eq!(stats.solve_duration, Duration::from_millis(1234));
    }

    #[test]
    fn test_display_formats_all_fields() {
        let stats = SolverStatistics {
            solutions_found: 2,
            used_threads: 4,
            masks_published: 9,
            refiner_passes: 1,
            solve_duration: Duration::from_millis(1234),
        };

        let rendered = format!("{}", stats);
        assert!(rendered.contains("Solver Statistics:"), "missing header");
        assert!(rendered.contains("Solutions Found: 2"));
        assert!(rendered.contains("Used Threads: 4"));
        assert!(rendered.contains("Masks Published: 9"));
        assert!(rendered.contains("Refiner Passes: 1"));
        assert!(rendered.contains("Solve Duration (secs): 1.234"));
    }
}
