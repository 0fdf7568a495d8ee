use crate::error::HnError;
use crate::types::Story;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    GoToTop,
    GoToBottom,

    /// Hide the story under the cursor and persist the flag.
    HideCurrent,
    /// Open the external link, falling back to the permalink.
    OpenLink,
    /// Open the discussion permalink.
    OpenComments,
    /// Copy the selected story's link to the clipboard.
    YankUrl,

    /// Start a load; also the retry path after a failed one.
    LoadFeed,
    /// A load finished. `load_id` identifies the generation that started
    /// it; stale completions are dropped.
    FeedLoaded {
        stories: Vec<Story>,
        failed: usize,
        load_id: u64,
    },

    Error(String),
    None,
}

impl From<HnError> for Action {
    fn from(err: HnError) -> Self {
        Action::Error(err.to_string())
    }
}
