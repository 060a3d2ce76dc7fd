//! Chat markup.
//!
//! Produces the same message elements the chat page builds, plus a terminal
//! text form.

use crate::markdown::{escape_html, markdown_to_plain, HtmlCache};

use super::input::CharCount;
use super::message::{Message, Role};

pub const USER_ICON: &str = "fa-user";
pub const DEFAULT_AGENT_ICON: &str = "fa-robot";

/// Avatar icon for a role given the agent's advertised icon.
pub fn avatar_icon<'a>(role: Role, agent_icon: Option<&'a str>) -> &'a str {
    match role {
        Role::User => USER_ICON,
        Role::Assistant | Role::Error => agent_icon
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_AGENT_ICON),
    }
}

/// Message body markup: markdown for agent replies, escaped text otherwise.
pub fn message_body_html(message: &Message, cache: &mut HtmlCache) -> String {
    match message.role {
        Role::Assistant => cache.render(&message.content),
        Role::User | Role::Error => escape_html(&message.content),
    }
}

/// Message body as the page's `textContent` would read it.
pub fn message_body_text(message: &Message) -> String {
    match message.role {
        Role::Assistant => markdown_to_plain(&message.content),
        Role::User | Role::Error => message.content.clone(),
    }
}

pub fn render_message_html(message: &Message, agent_icon: Option<&str>, cache: &mut HtmlCache) -> String {
    format!(
        r#"<div class="message {role}-message">
    <div class="message-avatar">
        <i class="fas {icon}"></i>
    </div>
    <div class="message-content">
        <div class="message-header">
            <span class="message-author">{author}</span>
            <span class="message-time">{time}</span>
        </div>
        <div class="message-body">
            {body}
        </div>
    </div>
</div>
"#,
        role = message.role.as_str(),
        icon = escape_html(avatar_icon(message.role, agent_icon)),
        author = message.role.author(),
        time = message.time_label(),
        body = message_body_html(message, cache),
    )
}

/// `[HH:MM] Author: body`
pub fn render_message_text(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.time_label(),
        message.role.author(),
        message_body_text(message)
    )
}

pub fn render_status_badge_html(connected: bool) -> String {
    if connected {
        r#"<span id="connectionStatus" class="status-badge connected"><i class="fas fa-circle"></i> Connected</span>"#
            .to_string()
    } else {
        r#"<span id="connectionStatus" class="status-badge"><i class="fas fa-circle"></i> Disconnected</span>"#
            .to_string()
    }
}

pub fn render_typing_indicator_html(visible: bool) -> String {
    let display = if visible { "flex" } else { "none" };
    format!(
        r#"<div id="typingIndicator" class="typing-indicator" style="display: {}"><span></span><span></span><span></span></div>"#,
        display
    )
}

pub fn render_char_count_html(count: &CharCount) -> String {
    format!(
        r#"<span id="charCount" style="color: {}">{}</span>"#,
        count.level.css_color(),
        count.label()
    )
}
