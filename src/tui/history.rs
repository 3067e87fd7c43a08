use std::collections::HashMap;

use crate::models::Cursor;

/// Identity of a page within one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageKey {
    First,
    At(Cursor),
}

impl PageKey {
    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::At(cursor) => Some(cursor),
            Self::First => None,
        }
    }
}

/// How a page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Initial,
    Next,
    Previous,
}

/// Page numbers and back links for one conversation tab.
///
/// The first page is number 1. Moving forward numbers the new page one past the
/// current one and links it back to the current page; moving back follows that link.
#[derive(Debug, Default)]
pub struct PageHistory {
    current: Option<PageKey>,
    numbers: HashMap<PageKey, u32>,
    links: HashMap<PageKey, Option<PageKey>>,
}

impl PageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` is now displayed and return its page number.
    pub fn visit(&mut self, key: PageKey, direction: Direction) -> u32 {
        let previous = self.current.take();

        match (&previous, direction) {
            (None, _) => {
                self.links.entry(key.clone()).or_insert(None);
            }
            (Some(prev), Direction::Next) if *prev != key => {
                self.links.insert(key.clone(), Some(prev.clone()));
            }
            _ => {}
        }

        let base = previous.as_ref().and_then(|p| self.numbers.get(p)).copied().unwrap_or(1);
        let number = *self.numbers.entry(key.clone()).or_insert_with(|| match (&previous, direction) {
            (Some(_), Direction::Next) => base + 1,
            (Some(_), Direction::Previous) => base.saturating_sub(1).max(1),
            _ => 1,
        });

        self.current = Some(key);
        number
    }

    pub fn current(&self) -> Option<&PageKey> {
        self.current.as_ref()
    }

    pub fn current_number(&self) -> Option<u32> {
        self.current.as_ref().and_then(|key| self.numbers.get(key)).copied()
    }

    /// Page to show when going back from the current one.
    pub fn previous_target(&self) -> Option<&PageKey> {
        self.current.as_ref().and_then(|key| self.links.get(key)).and_then(Option::as_ref)
    }

    /// Page numbers seen so far, ascending.
    pub fn visited_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.numbers.values().copied().collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}
