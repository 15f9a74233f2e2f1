//! Minimales Command-Log für Diagnose und Tests.
//!
//! Gespeichert werden nur die Command-Arten, keine Positionen oder Routen.

use super::NavCommand;

/// Art der ausgeführten Commands in Reihenfolge, begrenzt auf `MAX_ENTRIES`.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<&'static str>,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 1000;

    /// Erstellt ein leeres Command-Log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Vermerkt einen ausgeführten Command.
    /// Ist das Log voll, wird die ältere Hälfte verworfen.
    pub fn record(&mut self, command: &NavCommand) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        self.entries.push(command.kind());
    }

    /// Leert das Log (Ende einer Navigation).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zuletzt ausgeführter Command
    pub fn last(&self) -> Option<&'static str> {
        self.entries.last().copied()
    }

    /// Die letzten `n` Einträge, älteste zuerst.
    pub fn recent(&self, n: usize) -> &[&'static str] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_drops_oldest_half_when_full() {
        let mut log = CommandLog::new();
        for _ in 0..CommandLog::MAX_ENTRIES {
            log.record(&NavCommand::Pause);
        }
        log.record(&NavCommand::Stop);

        assert_eq!(log.len(), CommandLog::MAX_ENTRIES / 2 + 1);
        assert_eq!(log.last(), Some("stop"));
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = CommandLog::new();
        log.record(&NavCommand::Pause);
        log.record(&NavCommand::Resume { now_ms: 1 });
        log.record(&NavCommand::Stop);

        assert_eq!(log.recent(2), &["resume", "stop"]);
        assert_eq!(log.recent(10).len(), 3);

        log.clear();
        assert!(log.is_empty());
        assert!(log.recent(2).is_empty());
    }
}
