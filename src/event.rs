/// Notification sent to the host after a state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    /// A node was expanded or collapsed.
    ExpandChanged { key: String, expanded: bool },
    /// A node was selected or deselected.
    SelectedChanged { key: String, selected: bool },
    /// A node's checkbox was toggled by a check operation.
    CheckChanged { key: String, checked: bool },
    /// A search finished with the given number of matches.
    SearchCompleted { match_count: usize },
    /// Children of an async node are needed; answer with `attach_children`.
    LoadDataRequested { key: String },
}

/// Receiver of [`TreeEvent`]s.
pub trait TreeListener {
    fn on_event(&mut self, event: TreeEvent);
}

impl<F> TreeListener for F
where
    F: FnMut(TreeEvent),
{
    #[inline]
    fn on_event(&mut self, event: TreeEvent) {
        self(event);
    }
}

/// Listener that buffers events until the host drains them.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<TreeEvent>,
}

impl EventLog {
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    /// Removes and returns every buffered event.
    pub fn drain(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TreeListener for EventLog {
    fn on_event(&mut self, event: TreeEvent) {
        self.events.push(event);
    }
}

/// Listener that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoListener;

impl TreeListener for NoListener {
    #[inline]
    fn on_event(&mut self, _event: TreeEvent) {}
}
