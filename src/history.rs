use std::collections::VecDeque;
use std::fmt;

/// Entries retained before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 20;

/// One successful evaluation, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
  pub expression: String,
  pub result: String,
}

impl fmt::Display for HistoryEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} = {}", self.expression, self.result)
  }
}

/// Bounded log of `expression = result` pairs, newest first.
#[derive(Debug, Default, Clone)]
pub struct History {
  entries: VecDeque<HistoryEntry>,
}

impl History {
  pub fn record(&mut self, expression: &str, result: &str) {
    self.entries.push_front(HistoryEntry {
      expression: expression.to_string(),
      result: result.to_string(),
    });
    self.entries.truncate(HISTORY_CAPACITY);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
    self.entries.iter()
  }

  /// Readout for the UI layer, newest first.
  pub fn lines(&self) -> Vec<String> {
    self.entries.iter().map(ToString::to_string).collect()
  }
}
