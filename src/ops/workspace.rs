use crate::io::store::{Store, load_tree_or_placeholder};
use crate::model::cell::{Cell, CellId, CellKind, Field};
use crate::model::mandala::Mandala;
use crate::ops::cell_ops;
use crate::ops::editor::Editor;
use crate::ops::navigation::{DisplayMode, Navigation};

/// Single owner of the tree and of the view/edit state around it.
/// Every mutation goes through one of the commands below, and every
/// mutation that lands is saved through the store.
pub struct Workspace {
    mandala: Mandala,
    navigation: Navigation,
    display: DisplayMode,
    editor: Editor,
    store: Box<dyn Store>,
    /// Message from the most recent failed save, until taken
    save_error: Option<String>,
}

impl Workspace {
    pub fn new(mandala: Mandala, store: Box<dyn Store>) -> Self {
        Workspace {
            mandala,
            navigation: Navigation::Root,
            display: DisplayMode::Grid,
            editor: Editor::default(),
            store,
            save_error: None,
        }
    }

    /// Open the store's saved tree, or the placeholder tree
    pub fn load(store: Box<dyn Store>) -> Self {
        let mandala = load_tree_or_placeholder(store.as_ref());
        Workspace::new(mandala, store)
    }

    pub fn mandala(&self) -> &Mandala {
        &self.mandala
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn display(&self) -> DisplayMode {
        self.display
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// The nine cells of the current grid, center first
    pub fn visible_cells(&self) -> Vec<&Cell> {
        self.navigation.visible_cells(&self.mandala)
    }

    /// The error from the last failed save, clearing it
    pub fn take_save_error(&mut self) -> Option<String> {
        self.save_error.take()
    }

    fn save(&mut self) {
        match self.store.save_tree(&self.mandala) {
            Ok(()) => {
                tracing::debug!("saved tree");
                self.save_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save tree");
                self.save_error = Some(e.to_string());
            }
        }
    }

    // Edits

    pub fn update_field(&mut self, id: &CellId, field: Field, value: &str) -> bool {
        let updated = cell_ops::update_field(&mut self.mandala, id, field, value);
        if updated {
            self.save();
        }
        updated
    }

    pub fn begin_edit(&mut self, id: CellId, field: Field) {
        self.editor.begin_edit(id, field);
    }

    /// Write the edited value and end the session. Blur and confirm both
    /// come through here.
    pub fn commit_edit(&mut self, id: &CellId, field: Field, value: &str) -> bool {
        let updated = self.editor.commit_edit(&mut self.mandala, id, field, value);
        if updated {
            self.save();
        }
        updated
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel_edit();
    }

    // Navigation

    pub fn select(&mut self, id: &CellId) -> bool {
        self.navigation.select(&self.mandala, id)
    }

    pub fn collapse(&mut self) {
        self.navigation.collapse();
    }

    /// Activate the cell at a slot of the current grid (0 = center)
    pub fn activate(&mut self, slot: usize) -> bool {
        self.navigation.activate(&self.mandala, slot)
    }

    /// From the overview: show the grid expanded on `id`. Any other kind of
    /// cell shows the root grid.
    pub fn overview_select(&mut self, id: &CellId) -> bool {
        self.navigation.collapse();
        let expanded = match self.mandala.kind_of(id) {
            Some(CellKind::Main) => self.navigation.select(&self.mandala, id),
            _ => false,
        };
        self.display = DisplayMode::Grid;
        expanded
    }

    /// Back to the root grid, leaving the overview if it was showing
    pub fn navigate_to_parent(&mut self) {
        self.navigation.collapse();
        self.display = DisplayMode::Grid;
    }

    pub fn toggle_display(&mut self) -> DisplayMode {
        self.display = match self.display {
            DisplayMode::Grid => DisplayMode::Overview,
            DisplayMode::Overview => DisplayMode::Grid,
        };
        tracing::debug!(display = ?self.display, "toggled display mode");
        self.display
    }

    // Bulk changes

    /// Clear the grid currently on screen
    pub fn clear_scope(&mut self) -> bool {
        let scope = self.navigation.expanded().cloned();
        let cleared = cell_ops::clear_subtree(&mut self.mandala, scope.as_ref());
        if cleared {
            self.save();
        }
        cleared
    }

    pub fn clear_all(&mut self) {
        cell_ops::clear_all(&mut self.mandala);
        self.save();
    }

    /// Swap in a whole new tree (import). Any edit session is discarded and
    /// navigation falls back to the root grid if its cell is gone.
    pub fn replace_tree(&mut self, mandala: Mandala) {
        self.mandala = mandala;
        self.editor.cancel_edit();
        self.navigation.revalidate(&self.mandala);
        tracing::info!(cells = self.mandala.cell_count(), "replaced tree");
        self.save();
    }

    /// Restore the placeholder tree
    pub fn reset(&mut self) {
        self.replace_tree(Mandala::placeholder());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;

    fn workspace() -> Workspace {
        Workspace::new(Mandala::placeholder(), Box::new(MemoryStore::default()))
    }

    fn saved(ws: &Workspace) -> Option<Mandala> {
        ws.store().load_tree().unwrap()
    }

    #[test]
    fn load_uses_placeholder_when_store_is_empty() {
        let ws = Workspace::load(Box::new(MemoryStore::default()));
        assert_eq!(ws.mandala(), &Mandala::placeholder());
        assert_eq!(ws.navigation(), &Navigation::Root);
        assert_eq!(ws.display(), DisplayMode::Grid);
    }

    #[test]
    fn load_uses_saved_tree() {
        let store = MemoryStore::default();
        *store.tree.borrow_mut() = Some(Mandala::blank());
        let ws = Workspace::load(Box::new(store));
        assert_eq!(ws.mandala(), &Mandala::blank());
    }

    #[test]
    fn commit_saves() {
        let mut ws = workspace();
        ws.begin_edit(CellId::main(1), Field::Title);
        assert!(ws.commit_edit(&CellId::main(1), Field::Title, "Career"));
        assert!(ws.editor().session().is_none());
        assert_eq!(saved(&ws).unwrap().root.children[1].title, "Career");
    }

    #[test]
    fn commit_to_missing_cell_does_not_save() {
        let mut ws = workspace();
        ws.begin_edit(CellId::new("ghost"), Field::Title);
        assert!(!ws.commit_edit(&CellId::new("ghost"), Field::Title, "x"));
        assert!(saved(&ws).is_none());
        assert!(ws.editor().session().is_none());
    }

    #[test]
    fn failed_save_keeps_memory_state_and_reports() {
        let store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut ws = Workspace::new(Mandala::placeholder(), Box::new(store));
        assert!(ws.update_field(&CellId::center(), Field::Title, "Still here"));
        assert_eq!(ws.mandala().root.title, "Still here");
        assert!(ws.take_save_error().is_some());
        assert!(ws.take_save_error().is_none());
    }

    #[test]
    fn clear_scope_follows_navigation() {
        let mut ws = workspace();
        assert!(ws.select(&CellId::main(4)));
        assert!(ws.clear_scope());
        assert_eq!(ws.mandala().root.children[4].title, "");
        assert_eq!(ws.mandala().root.title, "Central theme");

        ws.collapse();
        assert!(ws.clear_scope());
        assert_eq!(ws.mandala().root.title, "");
        assert_eq!(ws.mandala().root.children[0].children[0].title, "甲 idea 1");
    }

    #[test]
    fn overview_select_collapses_then_expands() {
        let mut ws = workspace();
        ws.select(&CellId::main(0));
        ws.toggle_display();
        assert!(ws.overview_select(&CellId::main(6)));
        assert_eq!(ws.navigation(), &Navigation::Expanded(CellId::main(6)));
        assert_eq!(ws.display(), DisplayMode::Grid);
    }

    #[test]
    fn overview_select_of_center_shows_root() {
        let mut ws = workspace();
        ws.select(&CellId::main(0));
        ws.toggle_display();
        assert!(!ws.overview_select(&CellId::center()));
        assert_eq!(ws.navigation(), &Navigation::Root);
        assert_eq!(ws.display(), DisplayMode::Grid);
    }

    #[test]
    fn navigate_to_parent_leaves_overview() {
        let mut ws = workspace();
        ws.select(&CellId::main(3));
        assert_eq!(ws.toggle_display(), DisplayMode::Overview);
        ws.navigate_to_parent();
        assert_eq!(ws.navigation(), &Navigation::Root);
        assert_eq!(ws.display(), DisplayMode::Grid);
    }

    #[test]
    fn replace_tree_revalidates_and_saves() {
        let mut ws = workspace();
        ws.select(&CellId::main(2));
        ws.begin_edit(CellId::sub(2, 0), Field::Content);

        let mut other = Mandala::blank();
        other.root.children[2].id = CellId::new("renamed");
        ws.replace_tree(other.clone());

        assert_eq!(ws.navigation(), &Navigation::Root);
        assert!(ws.editor().session().is_none());
        assert_eq!(saved(&ws), Some(other));
    }

    #[test]
    fn replace_tree_keeps_valid_expansion() {
        let mut ws = workspace();
        ws.select(&CellId::main(2));
        ws.replace_tree(Mandala::blank());
        assert_eq!(ws.navigation(), &Navigation::Expanded(CellId::main(2)));
        assert_eq!(ws.visible_cells()[0].id, CellId::main(2));
    }

    #[test]
    fn reset_restores_placeholder() {
        let mut ws = workspace();
        ws.clear_all();
        assert_eq!(ws.mandala(), &Mandala::blank());
        ws.reset();
        assert_eq!(ws.mandala(), &Mandala::placeholder());
        assert_eq!(saved(&ws), Some(Mandala::placeholder()));
    }
}
