//! Incremental step validation of scanned code lines
//!
//! A single recognition pass over a camera frame usually yields only a
//! fragment of the full code line, so validation is incremental: the
//! `StepValidator` accepts one candidate text per frame, extracts the
//! portion relevant to the current step, verifies its check digit and,
//! only if correct, commits it. Advancing to the next step is a separate
//! explicit call so the caller decides whether to keep retrying or move
//! on. `ScanSession` wires the two calls together for callers that own a
//! recognition loop.
//!
//! One validator instance serves one scan session; calls are expected to
//! arrive sequentially from a single worker (one OCR result in flight at
//! a time), so no internal locking is needed.

use crate::core::checksum;
use crate::core::format::FormatSpec;
use crate::types::{CodeFormat, PaymentCode};
use tracing::debug;

/// Configuration-driven incremental validator for one code format
///
/// States are the step indices plus a terminal finished state; the only
/// transitions are `i -> i+1` after a successful `validate` at step `i`
/// followed by `advance`, and the unconditional return to step 0 via
/// `reset`. No transition skips a step or rewinds partially.
#[derive(Debug)]
pub struct StepValidator {
    spec: &'static FormatSpec,
    current_step: usize,
    committed: Vec<Option<String>>,
    related_text: Option<String>,
    finished: bool,
}

impl StepValidator {
    /// Create a validator for the given format, positioned at step 0
    pub fn new(format: CodeFormat) -> Self {
        let spec = FormatSpec::for_format(format);

        StepValidator {
            spec,
            current_step: 0,
            committed: vec![None; spec.steps.len()],
            related_text: None,
            finished: false,
        }
    }

    /// The format this validator was built for
    pub fn format(&self) -> CodeFormat {
        self.spec.format
    }

    /// Current step index, 0-based
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Number of steps in the format
    pub fn step_count(&self) -> usize {
        self.spec.steps.len()
    }

    /// Whether the last step has been committed
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Return to step 0, discarding all committed segments
    ///
    /// Idempotent and safe at any time; models session restart and
    /// cancellation. No external data is lost, only in-flight validation
    /// progress.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.finished = false;
        self.related_text = None;
        self.committed.iter_mut().for_each(|slot| *slot = None);
    }

    /// Extract the portion of `text` relevant to the current step
    ///
    /// Strips all whitespace, then optionally discards everything up to
    /// and including the previous step's terminator (the frame may still
    /// show the tail of the previous segment), then truncates just after
    /// the current step's terminator if more text follows it. The result
    /// is cached and also returned; it is not yet validated.
    ///
    /// Returns `None` for empty input.
    pub fn related_text(&mut self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }

        let rule = &self.spec.steps[self.current_step];
        let mut related: String = text.chars().filter(|c| !c.is_whitespace()).collect();

        if rule.trims_previous_terminator && self.current_step > 0 {
            let previous = self.spec.steps[self.current_step - 1].terminator;

            if let Some(index) = related.find(previous) {
                if index + previous.len_utf8() < related.len() {
                    related.drain(..index + previous.len_utf8());
                }
            }
        }

        if let Some(index) = related.find(rule.terminator) {
            if index + rule.terminator.len_utf8() < related.len() {
                related.truncate(index + rule.terminator.len_utf8());
            }
        }

        self.related_text = Some(related);
        self.related_text.as_deref()
    }

    /// The extraction cached by the last `related_text`/`validate` call
    ///
    /// Cleared on `advance` and `reset`.
    pub fn last_related_text(&self) -> Option<&str> {
        self.related_text.as_deref()
    }

    /// Validate one recognized text fragment against the current step
    ///
    /// On success the formatted segment is committed for the current step
    /// and `true` is returned; the caller then calls [`advance`] to move
    /// on. On any failure (wrong terminator, wrong length, non-digit
    /// content, check-digit mismatch) the state is unchanged and `false`
    /// is returned; the caller simply feeds the next frame.
    ///
    /// [`advance`]: StepValidator::advance
    pub fn validate(&mut self, text: &str) -> bool {
        let rule = self.spec.steps[self.current_step];

        let related = match self.related_text(text) {
            Some(related) => related.to_string(),
            None => return false,
        };

        if !related.ends_with(rule.terminator) {
            debug!(step = self.current_step, %related, "segment does not end with terminator");
            return false;
        }

        let length = related.chars().count();

        if !rule.accepts_length(length) {
            debug!(step = self.current_step, length, "segment length not accepted");
            return false;
        }

        // everything but the terminator is the digit span; its last digit
        // is the declared check digit
        let digits = match checksum::digits_from_text(&related, length - 1) {
            Some(digits) => digits,
            None => {
                debug!(step = self.current_step, %related, "non-digit in digit span");
                return false;
            }
        };

        if !checksum::verify(&digits) {
            debug!(step = self.current_step, %related, "check digit mismatch");
            return false;
        }

        self.committed[self.current_step] =
            Some(format!("{}{}", rule.output_prefix, related));
        true
    }

    /// Move to the next step, or finish if the last step was reached
    ///
    /// Returns `true` if a next step exists (the related-text cache is
    /// cleared), `false` after marking the validator finished.
    pub fn advance(&mut self) -> bool {
        if self.current_step < self.spec.steps.len() - 1 {
            self.current_step += 1;
            self.related_text = None;
            return true;
        }

        self.finished = true;
        false
    }

    /// The assembled, verified code row
    ///
    /// `Some` iff the validator is finished; concatenates the committed
    /// segments in step order, each with its output prefix applied.
    pub fn assembled_code(&self) -> Option<PaymentCode> {
        if !self.finished {
            return None;
        }

        let raw: String = self.committed.iter().flatten().cloned().collect();

        Some(PaymentCode {
            format: self.spec.format,
            raw,
        })
    }
}

/// Drives a `StepValidator` over a stream of recognized fragments
///
/// Owns the validate-then-advance call sequence: each fragment is
/// validated against the current step and, on success, the validator
/// advances. Once all steps are committed the assembled code is returned
/// and the session resets itself, ready for the next slip.
#[derive(Debug)]
pub struct ScanSession {
    validator: StepValidator,
}

impl ScanSession {
    /// Create a session scanning for the given format
    pub fn new(format: CodeFormat) -> Self {
        ScanSession {
            validator: StepValidator::new(format),
        }
    }

    /// Feed one recognized fragment
    ///
    /// Returns the completed code once the final step commits, `None`
    /// otherwise. Failed fragments leave the session unchanged.
    pub fn push_fragment(&mut self, text: &str) -> Option<PaymentCode> {
        if !self.validator.validate(text) {
            return None;
        }

        self.validator.advance();

        if !self.validator.finished() {
            return None;
        }

        let code = self.validator.assembled_code();
        self.validator.reset();
        code
    }

    /// Restart the session from step 0
    pub fn reset(&mut self) {
        self.validator.reset();
    }

    /// Step index the session is currently waiting on
    pub fn current_step(&self) -> usize {
        self.validator.current_step()
    }
}
