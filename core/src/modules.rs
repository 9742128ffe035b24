//! Shared resources handed to every collaborator.

use std::sync::Arc;

use crate::pos::PosMatcher;
use crate::suppression::SuppressionDictionary;
use crate::Config;

/// Control surface of a user dictionary that reloads in the background.
///
/// The orchestrator never spawns workers itself; it only forwards
/// reload/sync/wait to whoever owns them.
pub trait UserDictionaryControl: Send + Sync {
    fn reload(&self) -> bool;
    fn sync(&self) -> bool;
    fn wait_for_reloader(&self) -> bool;
}

/// Bundle of the resources shared by the decoder, predictor and rewriter.
#[derive(Clone, Default)]
pub struct Modules {
    pub pos_matcher: PosMatcher,
    pub suppression_dictionary: Arc<SuppressionDictionary>,
    pub user_dictionary: Option<Arc<dyn UserDictionaryControl>>,
}

impl Modules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the bundle from configuration, seeding the suppression
    /// dictionary with the configured blocked pairs.
    pub fn from_config(config: &Config) -> Self {
        Self {
            pos_matcher: PosMatcher::default(),
            suppression_dictionary: Arc::new(SuppressionDictionary::from_entries(
                &config.suppressed,
            )),
            user_dictionary: None,
        }
    }

    pub fn with_pos_matcher(mut self, pos_matcher: PosMatcher) -> Self {
        self.pos_matcher = pos_matcher;
        self
    }

    pub fn with_user_dictionary(mut self, control: Arc<dyn UserDictionaryControl>) -> Self {
        self.user_dictionary = Some(control);
        self
    }
}

impl std::fmt::Debug for Modules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modules")
            .field("pos_matcher", &self.pos_matcher)
            .field("suppression_dictionary", &self.suppression_dictionary)
            .field("user_dictionary", &self.user_dictionary.is_some())
            .finish()
    }
}
