use crate::panel::ImagePanel;

/// Stable identifier of an open panel. Starts at 1 and is never reused
/// within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u32);

impl PanelId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A panel together with the display resources sized for it. Both are
/// dropped together when the panel is removed.
pub struct OpenPanel<C> {
    pub id: PanelId,
    pub panel: ImagePanel,
    pub canvas: C,
}

/// Owns every open panel, in opening order, plus a focus stack whose last
/// entry is the focused panel.
pub struct PanelManager<C> {
    panels: Vec<OpenPanel<C>>,
    focus_order: Vec<PanelId>,
    next_id: u32,
}

impl<C> Default for PanelManager<C> {
    fn default() -> Self {
        Self {
            panels: Vec::new(),
            focus_order: Vec::new(),
            next_id: 1,
        }
    }
}

impl<C> PanelManager<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Takes ownership of `panel` and focuses it.
    pub fn add_panel(&mut self, panel: ImagePanel, canvas: C) -> PanelId {
        let id = PanelId(self.next_id);
        self.next_id += 1;
        tracing::info!("opened panel {} for {}", id, panel.path().display());
        self.panels.push(OpenPanel { id, panel, canvas });
        self.focus_order.push(id);
        id
    }

    /// Removes and returns the panel; focus falls back to the most recently
    /// focused survivor.
    pub fn remove_panel(&mut self, id: PanelId) -> Option<OpenPanel<C>> {
        let index = self.panels.iter().position(|p| p.id == id)?;
        self.focus_order.retain(|&f| f != id);
        let removed = self.panels.remove(index);
        tracing::info!("closed panel {} ({})", id, removed.panel.file_name());
        Some(removed)
    }

    /// Moves `id` to the top of the focus stack. Returns `false` for
    /// unknown ids.
    pub fn bring_to_front(&mut self, id: PanelId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.focused_id() != Some(id) {
            self.focus_order.retain(|&f| f != id);
            self.focus_order.push(id);
            tracing::debug!("panel {} focused", id);
        }
        true
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.iter().any(|p| p.id == id)
    }

    pub fn focused_id(&self) -> Option<PanelId> {
        self.focus_order.last().copied()
    }

    pub fn focused(&self) -> Option<&OpenPanel<C>> {
        let id = self.focused_id()?;
        self.get(id)
    }

    pub fn focused_mut(&mut self) -> Option<&mut OpenPanel<C>> {
        let id = self.focused_id()?;
        self.get_mut(id)
    }

    pub fn get(&self, id: PanelId) -> Option<&OpenPanel<C>> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut OpenPanel<C>> {
        self.panels.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenPanel<C>> {
        self.panels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OpenPanel<C>> {
        self.panels.iter_mut()
    }
}
