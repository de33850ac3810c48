//! Per-message render cycle: threads the verification state from the
//! message-load hook to the header-output hook.

use crate::model::header_output::HeaderOutput;
use crate::model::message::Message;
use crate::model::verification::VerificationState;
use crate::store::MailStore;

use super::{annotate, Smime};

/// State of one render cycle. Create one per viewed message (or reuse it;
/// every load replaces the previous state).
pub struct RenderCycle<'a> {
    smime: &'a Smime,
    store: &'a dyn MailStore,
    state: VerificationState,
}

impl<'a> RenderCycle<'a> {
    pub fn new(smime: &'a Smime, store: &'a dyn MailStore) -> Self {
        Self {
            smime,
            store,
            state: VerificationState::NotSigned,
        }
    }

    /// Hook: a message was loaded for display.
    pub fn on_message_load(&mut self, message: &Message) {
        self.state = self.smime.classify_and_verify(message, self.store);
    }

    /// Hook: header rows are about to be rendered.
    pub fn on_headers_output(&self, output: HeaderOutput) -> HeaderOutput {
        annotate(self.state, output)
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }
}
