//! Host-supplied hot keys consulted before the line editor.

use crate::core::key::KeyEvent;
use crate::core::line_editor::LineEditor;

/// Whether dispatch stops at a hot-key action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotKeyFlow {
    Consumed,
    PassThrough,
}

type Matcher = Box<dyn Fn(&KeyEvent) -> bool + Send>;
type Action = Box<dyn FnMut(&KeyEvent, &mut LineEditor) -> HotKeyFlow + Send>;

struct HotKey {
    matcher: Matcher,
    action: Action,
}

/// Ordered `(matcher, action)` table.
///
/// Entries run in registration order. The first matching action that returns
/// [`HotKeyFlow::Consumed`] ends dispatch; otherwise the event falls through to the editor.
#[derive(Default)]
pub struct HotKeys {
    entries: Vec<HotKey>,
}

impl HotKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<M, A>(&mut self, matcher: M, action: A)
    where
        M: Fn(&KeyEvent) -> bool + Send + 'static,
        A: FnMut(&KeyEvent, &mut LineEditor) -> HotKeyFlow + Send + 'static,
    {
        self.entries.push(HotKey {
            matcher: Box::new(matcher),
            action: Box::new(action),
        });
    }

    /// Register `action` for a key id such as `"shift+tab"` or `"ctrl+c"`.
    pub fn on<A>(&mut self, key_id: impl Into<String>, action: A)
    where
        A: FnMut(&KeyEvent, &mut LineEditor) -> HotKeyFlow + Send + 'static,
    {
        let key_id = key_id.into();
        self.push(move |event: &KeyEvent| event.matches(&key_id), action);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run matching actions in order. Returns `Consumed` if any action consumed the event.
    pub fn dispatch(&mut self, event: &KeyEvent, editor: &mut LineEditor) -> HotKeyFlow {
        for entry in &mut self.entries {
            if !(entry.matcher)(event) {
                continue;
            }
            if (entry.action)(event, editor) == HotKeyFlow::Consumed {
                return HotKeyFlow::Consumed;
            }
        }
        HotKeyFlow::PassThrough
    }
}

impl std::fmt::Debug for HotKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotKeys")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{HotKeyFlow, HotKeys};
    use crate::core::key::KeyEvent;
    use crate::core::line_editor::LineEditor;

    #[test]
    fn first_consuming_action_stops_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut hotkeys = HotKeys::new();

        let first = Arc::clone(&calls);
        hotkeys.on("shift+tab", move |_, _| {
            first.fetch_add(1, Ordering::SeqCst);
            HotKeyFlow::Consumed
        });
        let second = Arc::clone(&calls);
        hotkeys.on("shift+tab", move |_, _| {
            second.fetch_add(10, Ordering::SeqCst);
            HotKeyFlow::Consumed
        });

        let mut editor = LineEditor::new();
        assert_eq!(
            hotkeys.dispatch(&KeyEvent::ShiftTab, &mut editor),
            HotKeyFlow::Consumed
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pass_through_continues_to_later_entries() {
        let mut hotkeys = HotKeys::new();
        hotkeys.on("enter", |_, editor| {
            editor.insert("[seen]");
            HotKeyFlow::PassThrough
        });
        hotkeys.push(
            |event| matches!(event, KeyEvent::Return),
            |_, editor| {
                editor.insert("[again]");
                HotKeyFlow::PassThrough
            },
        );

        let mut editor = LineEditor::new();
        assert_eq!(
            hotkeys.dispatch(&KeyEvent::Return, &mut editor),
            HotKeyFlow::PassThrough
        );
        assert_eq!(editor.text(), "[seen][again]");
    }

    #[test]
    fn unmatched_event_passes_through() {
        let mut hotkeys = HotKeys::new();
        hotkeys.on("ctrl+o", |_, _| HotKeyFlow::Consumed);

        let mut editor = LineEditor::new();
        assert_eq!(
            hotkeys.dispatch(&KeyEvent::character("o"), &mut editor),
            HotKeyFlow::PassThrough
        );
        assert_eq!(hotkeys.len(), 1);
    }
}
