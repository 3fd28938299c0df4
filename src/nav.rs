// src/nav.rs - Keyboard navigation over the match list

use log::debug;

use crate::engine::Autocomplete;
use crate::highlight::Highlighter;
use crate::source::ItemSource;

/// The discrete key classes the navigation machine reacts to. Everything the
/// machine does not care about collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
    Tab,
    Other,
}

impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            _ => Key::Other,
        }
    }
}

/// Snapshot of the navigation state. `index: None` means no active row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub index: Option<usize>,
    pub hidden: bool,
    pub loading: bool,
}

/// Scroll-into-view: keep the active row inside the viewport band, snapping
/// to the row's top when it sits above and to its bottom when it sits below.
/// Pure in its inputs; returns the (possibly unchanged) viewport offset.
pub fn scroll_to(index: usize, row_height: f32, visible_rows: f32, scroll_top: f32) -> f32 {
    let top = row_height * index as f32;
    let bottom = top + row_height;
    let viewport = row_height * visible_rows;
    if top < scroll_top {
        top
    } else if bottom > scroll_top + viewport {
        bottom - viewport
    } else {
        scroll_top
    }
}

impl<T, S> Autocomplete<T, S>
where
    T: Clone + Send + 'static,
    S: ItemSource<T>,
{
    /// Feed one key event through the navigation machine.
    ///
    /// Up/Down/Enter are ignored while a fetch is loading: the list is about
    /// to be replaced, so navigating it would be meaningless. Moving up from
    /// "no active row" snaps to row 0 rather than staying inactive; moving
    /// down past the last row stays on the last row. Tab is a deliberate
    /// pass-through so the host's focus handling keeps working.
    pub fn on_key(&mut self, key: Key) {
        match key {
            Key::Down => {
                if self.loading {
                    return;
                }
                if self.matches.is_empty() {
                    self.index = None;
                    return;
                }
                let last = self.matches.len() - 1;
                self.index = Some(match self.index {
                    Some(i) => (i + 1).min(last),
                    None => 0,
                });
                self.update_scroll();
            }
            Key::Up => {
                if self.loading {
                    return;
                }
                if self.matches.is_empty() {
                    self.index = None;
                    return;
                }
                // Floor at zero: from no selection this lands on row 0.
                self.index = Some(match self.index {
                    Some(i) => i.saturating_sub(1),
                    None => 0,
                });
                self.update_scroll();
            }
            Key::Enter => {
                if self.loading {
                    return;
                }
                self.select(self.index);
            }
            Key::Escape => {
                self.matches.clear();
                self.hidden = true;
                self.index = None;
                // The raw search text stays as typed.
            }
            Key::Tab => {}
            Key::Other => {
                // Immediate phase: drop the active row, re-evaluate hiding
                // against the not-yet-updated text. The deferred phase runs
                // when the text value settles (set_search_text /
                // on_text_settled).
                self.index = None;
                self.hidden = self.auto_hide();
                self.pending_settle = true;
            }
        }
    }

    /// Commit a selection. `None` (Enter with no active row, or an explicit
    /// clear) produces no selected item and leaves the search text alone;
    /// either way the list empties and hides.
    pub fn select(&mut self, index: Option<usize>) {
        let chosen = index.and_then(|i| self.matches.get(i).cloned());
        if let Some(item) = &chosen {
            self.search_text = self.display_of(item);
            self.highlighter = Highlighter::new(&self.search_text);
            debug!("selected {:?}", self.search_text);
        }
        self.selected = chosen;
        self.hidden = true;
        self.index = None;
        self.matches.clear();
    }

    /// Explicit clear action: empty the search text and drop any selection.
    /// Returning focus to the input is the host's job.
    pub fn clear(&mut self) {
        self.set_search_text("");
        self.select(None);
    }

    pub fn nav_state(&self) -> NavState {
        NavState {
            index: self.index,
            hidden: self.hidden,
            loading: self.loading,
        }
    }

    /// The sole remaining suggestion is exactly what the user already typed,
    /// so no dropdown affordance is needed.
    pub(crate) fn auto_hide(&self) -> bool {
        self.matches.len() == 1 && self.display_of(&self.matches[0]) == self.search_text
    }

    /// One-directional form used after query delivery: may hide an open list
    /// but never re-opens a closed one.
    pub(crate) fn apply_auto_hide(&mut self) {
        if self.auto_hide() {
            self.hidden = true;
        }
    }

    fn update_scroll(&mut self) {
        if let Some(index) = self.index {
            self.scroll_top = scroll_to(
                index,
                self.config.row_height,
                self.config.visible_rows,
                self.scroll_top,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_row_above_snaps_to_its_top() {
        // Row 1 starts at 41.0; viewport scrolled down to 82.0
        assert_eq!(scroll_to(1, 41.0, 5.5, 82.0), 41.0);
    }

    #[test]
    fn test_scroll_row_below_brings_bottom_into_view() {
        // Row 9 ends at 410.0; viewport is 225.5 tall starting at 0.0
        assert_eq!(scroll_to(9, 41.0, 5.5, 0.0), 410.0 - 225.5);
    }

    #[test]
    fn test_scroll_visible_row_leaves_offset_alone() {
        assert_eq!(scroll_to(2, 41.0, 5.5, 41.0), 41.0);
    }

    #[test]
    fn test_key_from_crossterm() {
        use crossterm::event::KeyCode;
        assert_eq!(Key::from(KeyCode::Up), Key::Up);
        assert_eq!(Key::from(KeyCode::Down), Key::Down);
        assert_eq!(Key::from(KeyCode::Enter), Key::Enter);
        assert_eq!(Key::from(KeyCode::Esc), Key::Escape);
        assert_eq!(Key::from(KeyCode::Tab), Key::Tab);
        assert_eq!(Key::from(KeyCode::Char('x')), Key::Other);
        assert_eq!(Key::from(KeyCode::Backspace), Key::Other);
    }
}
