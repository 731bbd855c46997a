//! Engine configuration and host markup selectors.

use serde::Deserialize;

/// How a resolved emote is rendered into the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// `<img src=... title=name>`.
    Image,
    /// Styled inline span with the image as background, keeping the
    /// `:name:` text visible.
    Span,
}

/// Class/role markers of the host application's markup.
///
/// These are integration details, not engine design: when the host ships
/// markup changes, this struct is the only thing that needs updating.
/// Defaults match Rocket.Chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Main timeline list (`ul` tag).
    pub timeline_class: String,
    /// Thread panel message list (`ul` tag).
    pub thread_class: String,
    /// One rendered message.
    pub message_class: String,
    /// Message body inside a message node.
    pub message_body_class: String,
    /// Composer text input.
    pub composer_class: String,
    /// `role` attribute of the suggestion popup.
    pub popup_role: String,
    /// Class of the replaceable suggestion list body inside the popup.
    pub popup_list_class: String,
    /// `aria-labelledby` value identifying the open thread panel.
    pub thread_panel_label: String,
    /// `role` attribute of emoji-rendered spans.
    pub emoji_role: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            timeline_class: "messages-list".into(),
            thread_class: "thread".into(),
            message_class: "rcx-message".into(),
            message_body_class: "rcx-message-body".into(),
            composer_class: "rc-message-box__textarea".into(),
            popup_role: "menu".into(),
            popup_list_class: "rcx-box--full".into(),
            thread_panel_label: "contextualbarTitle".into(),
            emoji_role: "img".into(),
        }
    }
}

/// Tunables for the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selectors: Selectors,
    pub render_style: RenderStyle,
    /// Autocomplete debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Maximum suggestions requested per autocomplete search.
    pub search_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            render_style: RenderStyle::Image,
            debounce_ms: 300,
            search_limit: 10,
        }
    }
}
