//! Frontend State
//!
//! Client-side model of the portfolio page:
//! - **CardStacks**: one deal/return state machine per content category
//! - **Theme**: light/dark attribute, icon opacity and card placeholders
//!
//! Rendering stays in the browser; these types only decide what happens next.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::content::Category;

/// Card stack states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackState {
    /// Never dealt
    #[default]
    Idle,
    /// Cards requested or on screen
    Dealt,
    /// Cards taken back
    Returned,
}

/// Inputs to a card stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    /// The stack control was clicked
    Click,
    /// The content request finished with this many items
    Loaded(usize),
    /// The content request failed
    Failed,
}

/// What the renderer should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Request `GET /api/content/<category>`
    Fetch(Category),
    /// Render this many cards
    Render(usize),
    /// Remove the cards
    Clear,
    /// Nothing to do (stale response)
    Ignore,
}

#[derive(Debug, Clone, Copy, Default)]
struct Stack {
    state: StackState,
    /// Set once a fetch for the current deal has completed
    cards: Option<usize>,
}

/// Per-category card stacks
#[derive(Debug, Default)]
pub struct CardStacks {
    stacks: HashMap<Category, Stack>,
}

impl CardStacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, category: Category) -> StackState {
        self.stacks.get(&category).map(|s| s.state).unwrap_or_default()
    }

    /// Cards currently rendered for a category
    pub fn cards(&self, category: Category) -> Option<usize> {
        self.stacks
            .get(&category)
            .filter(|s| s.state == StackState::Dealt)
            .and_then(|s| s.cards)
    }

    /// Apply an event to one category's stack
    pub fn handle(&mut self, category: Category, event: StackEvent) -> Transition {
        let stack = self.stacks.entry(category).or_default();

        let transition = match (stack.state, event) {
            (StackState::Idle | StackState::Returned, StackEvent::Click) => {
                stack.state = StackState::Dealt;
                stack.cards = None;
                Transition::Fetch(category)
            }
            (StackState::Dealt, StackEvent::Click) => {
                stack.state = StackState::Returned;
                stack.cards = None;
                Transition::Clear
            }
            (StackState::Dealt, StackEvent::Loaded(count)) if stack.cards.is_none() => {
                stack.cards = Some(count);
                Transition::Render(count)
            }
            (StackState::Dealt, StackEvent::Failed) if stack.cards.is_none() => {
                // Nothing was dealt, so the next click starts over
                stack.state = StackState::Idle;
                Transition::Clear
            }
            _ => Transition::Ignore,
        };

        debug!(%category, ?event, state = ?stack.state, ?transition, "Card stack event");
        transition
    }
}

/// Page theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Parse the persisted `data-theme` attribute; anything unknown is dark
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// (sun, moon) icon opacity
    pub fn icon_opacity(&self) -> (f32, f32) {
        match self {
            Theme::Dark => (1.0, 0.0),
            Theme::Light => (0.0, 1.0),
        }
    }

    pub fn placeholder_image(&self) -> &'static str {
        match self {
            Theme::Light => "/light/card.jpg",
            Theme::Dark => "/dark/card.jpg",
        }
    }

    /// Image for a card, falling back to the theme placeholder
    pub fn card_image<'a>(&self, custom: Option<&'a str>) -> &'a str {
        match custom.map(str::trim) {
            Some(image) if !image.is_empty() => image,
            _ => self.placeholder_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_render_return_cycle() {
        let mut stacks = CardStacks::new();
        assert_eq!(stacks.state(Category::Blog), StackState::Idle);

        assert_eq!(
            stacks.handle(Category::Blog, StackEvent::Click),
            Transition::Fetch(Category::Blog)
        );
        assert_eq!(stacks.state(Category::Blog), StackState::Dealt);
        assert_eq!(stacks.handle(Category::Blog, StackEvent::Loaded(3)), Transition::Render(3));
        assert_eq!(stacks.cards(Category::Blog), Some(3));

        assert_eq!(stacks.handle(Category::Blog, StackEvent::Click), Transition::Clear);
        assert_eq!(stacks.state(Category::Blog), StackState::Returned);
        assert_eq!(stacks.cards(Category::Blog), None);

        assert_eq!(
            stacks.handle(Category::Blog, StackEvent::Click),
            Transition::Fetch(Category::Blog)
        );
    }

    #[test]
    fn test_categories_are_independent() {
        let mut stacks = CardStacks::new();
        stacks.handle(Category::Project, StackEvent::Click);
        assert_eq!(stacks.state(Category::Project), StackState::Dealt);
        assert_eq!(stacks.state(Category::Github), StackState::Idle);
    }

    #[test]
    fn test_stale_load_after_return_ignored() {
        let mut stacks = CardStacks::new();
        stacks.handle(Category::Github, StackEvent::Click);
        stacks.handle(Category::Github, StackEvent::Click);
        assert_eq!(stacks.handle(Category::Github, StackEvent::Loaded(5)), Transition::Ignore);
        assert_eq!(stacks.cards(Category::Github), None);
    }

    #[test]
    fn test_failed_fetch_resets_to_idle() {
        let mut stacks = CardStacks::new();
        stacks.handle(Category::Blog, StackEvent::Click);
        assert_eq!(stacks.handle(Category::Blog, StackEvent::Failed), Transition::Clear);
        assert_eq!(stacks.state(Category::Blog), StackState::Idle);
    }

    #[test]
    fn test_theme_toggle_and_opacity() {
        let theme = Theme::default();
        assert_eq!(theme, Theme::Dark);
        assert_eq!(theme.icon_opacity(), (1.0, 0.0));

        let light = theme.toggle();
        assert_eq!(light.attribute(), "light");
        assert_eq!(light.icon_opacity(), (0.0, 1.0));
        assert_eq!(light.toggle(), Theme::Dark);
    }

    #[test]
    fn test_theme_from_attribute() {
        assert_eq!(Theme::from_attribute(Some("light")), Theme::Light);
        assert_eq!(Theme::from_attribute(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_attribute(Some("sepia")), Theme::Dark);
        assert_eq!(Theme::from_attribute(None), Theme::Dark);
    }

    #[test]
    fn test_card_image_placeholder() {
        assert_eq!(Theme::Light.card_image(None), "/light/card.jpg");
        assert_eq!(Theme::Dark.card_image(Some("")), "/dark/card.jpg");
        assert_eq!(Theme::Dark.card_image(Some("/img/a.png")), "/img/a.png");
    }
}
