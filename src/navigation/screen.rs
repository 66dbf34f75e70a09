//! Transport-neutral screen description

use super::codec::{CallbackToken, EncodeError, NavigationAction};
use crate::i18n::RequestContext;

/// What a button does when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonTarget {
    Callback(CallbackToken),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub target: ButtonTarget,
}

impl Button {
    /// Button leading to `action`, with a freshly encoded token
    pub fn navigate(label: impl Into<String>, action: &NavigationAction) -> Result<Self, EncodeError> {
        Ok(Self {
            label: label.into(),
            target: ButtonTarget::Callback(action.encode()?),
        })
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
        }
    }

    pub fn token(&self) -> Option<&CallbackToken> {
        match &self.target {
            ButtonTarget::Callback(token) => Some(token),
            ButtonTarget::Url(_) => None,
        }
    }
}

/// Rendered output of one handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub rows: Vec<Vec<Button>>,
    /// Persistent reply keyboard to install alongside the message
    pub menu: Option<Vec<Vec<String>>>,
    /// Context the interaction switched to while rendering this screen
    pub context: Option<RequestContext>,
}

impl Screen {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    /// One button per row
    pub fn column(mut self, buttons: Vec<Button>) -> Self {
        self.rows.extend(buttons.into_iter().map(|button| vec![button]));
        self
    }

    /// Lay `buttons` out `width` per row
    pub fn grid(mut self, buttons: Vec<Button>, width: usize) -> Self {
        let mut buttons = buttons.into_iter().peekable();
        while buttons.peek().is_some() {
            self.rows.push(buttons.by_ref().take(width.max(1)).collect());
        }
        self
    }

    pub fn with_menu(mut self, menu: Vec<Vec<String>>) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Publish `context` as the interaction's context from now on
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Button whose label contains `needle`
    pub fn find_button(&self, needle: &str) -> Option<&Button> {
        self.buttons().find(|button| button.label.contains(needle))
    }
}
