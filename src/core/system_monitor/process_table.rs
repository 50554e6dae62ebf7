//! Sorting, filtering and selection over the latest process snapshot.
//!
//! The table keeps the full snapshot sorted by the active [`SortSpec`].
//! When a filter is active a filtered view is derived from that snapshot;
//! it is recomputed on every filter edit and on every new snapshot, never
//! kept as a frozen copy.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::metrics::ProcessMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortColumn {
    Pid,
    User,
    Virt,
    Res,
    Cpu,
    Mem,
    Time,
    Cmd,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Pid,
        SortColumn::User,
        SortColumn::Virt,
        SortColumn::Res,
        SortColumn::Cpu,
        SortColumn::Mem,
        SortColumn::Time,
        SortColumn::Cmd,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::User => "USER",
            SortColumn::Virt => "VIRT",
            SortColumn::Res => "RES",
            SortColumn::Cpu => "CPU",
            SortColumn::Mem => "MEM",
            SortColumn::Time => "TIME",
            SortColumn::Cmd => "CMD",
        }
    }

    /// Magnitude columns sort largest first, textual ones alphabetically.
    pub fn descending_by_default(self) -> bool {
        !matches!(self, SortColumn::Pid | SortColumn::User | SortColumn::Cmd)
    }

    /// The column to the left, or `None` at the first column.
    pub fn prev(self) -> Option<SortColumn> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// The column to the right, or `None` at the last column.
    pub fn next(self) -> Option<SortColumn> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub reverse: bool,
}

impl SortSpec {
    pub fn new(column: SortColumn, reverse: bool) -> Self {
        Self { column, reverse }
    }

    /// Total order: column key (optionally reversed), then ascending pid.
    pub fn compare(&self, a: &ProcessMetrics, b: &ProcessMetrics) -> Ordering {
        let key = match self.column {
            SortColumn::Pid => a.pid.cmp(&b.pid),
            SortColumn::User => a.user.to_lowercase().cmp(&b.user.to_lowercase()),
            SortColumn::Virt => b.virtual_bytes.cmp(&a.virtual_bytes),
            SortColumn::Res => b.resident_bytes.cmp(&a.resident_bytes),
            SortColumn::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
            SortColumn::Mem => b.memory_percent.total_cmp(&a.memory_percent),
            SortColumn::Time => b.cpu_time_secs.total_cmp(&a.cpu_time_secs),
            SortColumn::Cmd => a.command.to_lowercase().cmp(&b.command.to_lowercase()),
        };
        let key = if self.reverse { key.reverse() } else { key };
        key.then_with(|| a.pid.cmp(&b.pid))
    }

    pub fn sort(&self, processes: &mut [ProcessMetrics]) {
        processes.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortColumn::Cpu, false)
    }
}

/// Case-insensitive substring match against the command name.
pub fn matches_filter(process: &ProcessMetrics, needle_lower: &str) -> bool {
    process.command.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    snapshot: Vec<ProcessMetrics>,
    filter: String,
    filtered: Option<Vec<ProcessMetrics>>,
    sort: SortSpec,
    selected: usize,
}

impl ProcessTable {
    pub fn new(sort: SortSpec) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    /// Replace the snapshot, re-sort, re-filter, and keep the selection on
    /// the same pid when it is still visible.
    pub fn set_snapshot(&mut self, mut processes: Vec<ProcessMetrics>) {
        let selected_pid = self.selected().map(|p| p.pid);
        self.sort.sort(&mut processes);
        self.snapshot = processes;
        self.refresh_filtered();

        let position =
            selected_pid.and_then(|pid| self.visible().iter().position(|p| p.pid == pid));
        self.selected = position.unwrap_or(self.selected);
        self.clamp_selection();
    }

    /// The full latest snapshot in sort order.
    pub fn snapshot(&self) -> &[ProcessMetrics] {
        &self.snapshot
    }

    /// The rows currently shown: the filtered view when filtering, else the snapshot.
    pub fn visible(&self) -> &[ProcessMetrics] {
        match &self.filtered {
            Some(filtered) => filtered,
            None => &self.snapshot,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.on_filter_changed();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.on_filter_changed();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.on_filter_changed();
    }

    pub fn clear_filter(&mut self) {
        if self.filter.is_empty() && self.filtered.is_none() {
            return;
        }
        self.filter.clear();
        self.on_filter_changed();
    }

    fn on_filter_changed(&mut self) {
        self.refresh_filtered();
        self.selected = 0;
    }

    fn refresh_filtered(&mut self) {
        if self.filter.is_empty() {
            self.filtered = None;
            return;
        }
        let needle = self.filter.to_lowercase();
        self.filtered = Some(
            self.snapshot
                .iter()
                .filter(|p| matches_filter(p, &needle))
                .cloned()
                .collect(),
        );
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        if self.sort == sort {
            return;
        }
        let selected_pid = self.selected().map(|p| p.pid);
        self.sort = sort;
        self.sort.sort(&mut self.snapshot);
        self.refresh_filtered();
        if let Some(pos) =
            selected_pid.and_then(|pid| self.visible().iter().position(|p| p.pid == pid))
        {
            self.selected = pos;
        }
        self.clamp_selection();
    }

    /// Move the sort column left (`-1`) or right (`+1`). Returns true if it changed.
    pub fn shift_sort_column(&mut self, forward: bool) -> bool {
        let next = if forward {
            self.sort.column.next()
        } else {
            self.sort.column.prev()
        };
        match next {
            Some(column) => {
                self.set_sort(SortSpec::new(column, self.sort.reverse));
                true
            }
            None => false,
        }
    }

    pub fn toggle_reverse(&mut self) {
        self.set_sort(SortSpec::new(self.sort.column, !self.sort.reverse));
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&ProcessMetrics> {
        self.visible().get(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected += 1;
        self.clamp_selection();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible().len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
