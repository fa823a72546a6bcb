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

use crate::{
    chromosome::Phenotype,
    monitor::evolution_monitor::{EvolutionMonitor, GenerationReport},
    stats::EvolutionStatistics,
};
use waymark_search::monitor::search_monitor::SearchCommand;

/// Forwards every event to its children in insertion order.
#[derive(Default)]
pub struct CompositeEvolutionMonitor<'a> {
    monitors: Vec<Box<dyn EvolutionMonitor + 'a>>,
}

impl<'a> CompositeEvolutionMonitor<'a> {
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: EvolutionMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline]
    pub fn add_boxed_monitor(&mut self, monitor: Box<dyn EvolutionMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline]
    pub fn monitors(&self) -> &[Box<dyn EvolutionMonitor + 'a>] {
        &self.monitors
    }
}

impl<'a> std::fmt::Debug for CompositeEvolutionMonitor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}

impl<'a> EvolutionMonitor for CompositeEvolutionMonitor<'a> {
    fn name(&self) -> &str {
        "CompositeEvolutionMonitor"
    }

    fn on_start(&mut self, num_cities: usize) {
        for m in &mut self.monitors {
            m.on_start(num_cities);
        }
    }

    fn on_generation(&mut self, report: &GenerationReport, statistics: &EvolutionStatistics) {
        for m in &mut self.monitors {
            m.on_generation(report, statistics);
        }
    }

    fn on_end(&mut self, best: &Phenotype, statistics: &EvolutionStatistics) {
        for m in &mut self.monitors {
            m.on_end(best, statistics);
        }
    }

    fn search_command(&mut self, statistics: &EvolutionStatistics) -> SearchCommand {
        for m in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = m.search_command(statistics) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }
}
