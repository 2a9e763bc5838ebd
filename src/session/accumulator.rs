/// Collects final recognition results into a transcript
///
/// Continuous recognition engines are known to redeliver the same final phrase
/// across adjacent recognition windows, so a final result identical (after trimming)
/// to the one just before it is dropped. Repeats further apart are kept.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    /// Finalized lines, in engine order
    segments: Vec<String>,

    /// Last finalized text, for duplicate suppression
    last_segment: String,

    duplicates_suppressed: usize,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisional text; does not change the transcript
    pub fn on_partial(&self, _text: &str) {}

    /// Record a final result; returns whether it was appended
    pub fn on_final(&mut self, text: &str) -> bool {
        let text = text.trim();

        if text == self.last_segment.trim() {
            self.duplicates_suppressed += 1;
            return false;
        }

        self.segments.push(text.to_string());
        self.last_segment = text.to_string();
        true
    }

    /// Transcript so far: one line per segment, trimmed
    pub fn build(&self) -> String {
        self.segments.join("\n").trim().to_string()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn duplicates_suppressed(&self) -> usize {
        self.duplicates_suppressed
    }
}
