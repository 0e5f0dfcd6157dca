use crate::model::cell::{Cell, CellId, CellKind};
use crate::model::mandala::Mandala;

/// Which nine-cell grid is on screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Center plus the 8 main cells
    #[default]
    Root,
    /// A main cell as the center, its 8 sub cells around it
    Expanded(CellId),
}

/// Single grid or the full 81-cell overview. Independent of `Navigation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Grid,
    Overview,
}

impl Navigation {
    pub fn expanded(&self) -> Option<&CellId> {
        match self {
            Navigation::Root => None,
            Navigation::Expanded(id) => Some(id),
        }
    }

    /// Expand a main cell. Only valid from `Root`, and only for a main cell
    /// that has children; anything else leaves the state alone.
    pub fn select(&mut self, mandala: &Mandala, id: &CellId) -> bool {
        if !matches!(self, Navigation::Root) {
            return false;
        }
        let expandable = mandala.kind_of(id) == Some(CellKind::Main)
            && mandala
                .main_cells()
                .iter()
                .any(|c| c.id == *id && c.has_children());
        if !expandable {
            return false;
        }
        tracing::debug!(cell = %id, "expanded main cell");
        *self = Navigation::Expanded(id.clone());
        true
    }

    /// Back to the root grid
    pub fn collapse(&mut self) {
        if let Navigation::Expanded(id) = self {
            tracing::debug!(cell = %id, "collapsed to root grid");
        }
        *self = Navigation::Root;
    }

    /// Activate the cell at a grid slot (0 = center). The center of an
    /// expanded grid collapses it; an outer slot of the root grid expands
    /// that main cell. Sub cells never expand.
    pub fn activate(&mut self, mandala: &Mandala, slot: usize) -> bool {
        match self {
            Navigation::Expanded(_) if slot == 0 => {
                self.collapse();
                true
            }
            Navigation::Expanded(_) => false,
            Navigation::Root if slot == 0 => false,
            Navigation::Root => match mandala.main_cells().get(slot - 1) {
                Some(main) => {
                    let id = main.id.clone();
                    self.select(mandala, &id)
                }
                None => false,
            },
        }
    }

    /// The nine cells on screen, center first, then slots 1..=8.
    /// Falls back to the root grid if the expanded cell is gone.
    pub fn visible_cells<'a>(&self, mandala: &'a Mandala) -> Vec<&'a Cell> {
        let center = match self {
            Navigation::Root => &mandala.root,
            Navigation::Expanded(id) => mandala
                .main_cells()
                .iter()
                .find(|c| c.id == *id)
                .unwrap_or(&mandala.root),
        };
        std::iter::once(center).chain(center.children.iter()).collect()
    }

    /// Reset to `Root` when the expanded cell no longer exists in `mandala`
    pub fn revalidate(&mut self, mandala: &Mandala) {
        if let Navigation::Expanded(id) = self
            && mandala.kind_of(id) != Some(CellKind::Main)
        {
            tracing::debug!(cell = %id, "expanded cell vanished; back to root grid");
            *self = Navigation::Root;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_from_root_expands() {
        let m = Mandala::placeholder();
        let mut nav = Navigation::Root;
        assert!(nav.select(&m, &CellId::main(3)));
        assert_eq!(nav, Navigation::Expanded(CellId::main(3)));
    }

    #[test]
    fn select_without_children_is_noop() {
        let mut m = Mandala::placeholder();
        m.root.children[0].children.clear();
        let mut nav = Navigation::Root;
        assert!(!nav.select(&m, &CellId::main(0)));
        assert_eq!(nav, Navigation::Root);
    }

    #[test]
    fn select_non_main_is_noop() {
        let m = Mandala::placeholder();
        let mut nav = Navigation::Root;
        assert!(!nav.select(&m, &CellId::center()));
        assert!(!nav.select(&m, &CellId::sub(0, 0)));
        assert!(!nav.select(&m, &CellId::new("ghost")));
        assert_eq!(nav, Navigation::Root);
    }

    #[test]
    fn no_direct_expanded_to_expanded() {
        let m = Mandala::placeholder();
        let mut nav = Navigation::Expanded(CellId::main(0));
        assert!(!nav.select(&m, &CellId::main(1)));
        assert_eq!(nav, Navigation::Expanded(CellId::main(0)));
    }

    #[test]
    fn collapse_always_returns_to_root() {
        let mut m = Mandala::placeholder();
        let mut nav = Navigation::Root;
        nav.select(&m, &CellId::main(5));
        crate::ops::cell_ops::update_field(
            &mut m,
            &CellId::main(5),
            crate::model::Field::Title,
            "edited meanwhile",
        );
        nav.collapse();
        assert_eq!(nav, Navigation::Root);
        nav.collapse();
        assert_eq!(nav, Navigation::Root);
    }

    #[test]
    fn activate_slots() {
        let m = Mandala::placeholder();
        let mut nav = Navigation::Root;
        assert!(!nav.activate(&m, 0));
        assert!(nav.activate(&m, 2));
        assert_eq!(nav, Navigation::Expanded(CellId::main(1)));
        // Sub cells don't expand further
        assert!(!nav.activate(&m, 4));
        assert_eq!(nav, Navigation::Expanded(CellId::main(1)));
        // The center collapses
        assert!(nav.activate(&m, 0));
        assert_eq!(nav, Navigation::Root);
    }

    #[test]
    fn visible_cells_root_and_expanded() {
        let m = Mandala::placeholder();
        let mut nav = Navigation::Root;
        let cells = nav.visible_cells(&m);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0].id, CellId::center());
        assert_eq!(cells[8].id, CellId::main(7));

        nav.select(&m, &CellId::main(6));
        let cells = nav.visible_cells(&m);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0].id, CellId::main(6));
        assert_eq!(cells[1].id, CellId::sub(6, 0));
        assert_eq!(cells[8].id, CellId::sub(6, 7));
    }

    #[test]
    fn visible_cells_are_views_into_the_tree() {
        let m = Mandala::placeholder();
        let nav = Navigation::Expanded(CellId::main(0));
        let cells = nav.visible_cells(&m);
        assert!(std::ptr::eq(cells[1], &m.root.children[0].children[0]));
    }

    #[test]
    fn revalidate_drops_missing_expansion() {
        let m = Mandala::blank();
        let mut nav = Navigation::Expanded(CellId::new("from-an-older-tree"));
        nav.revalidate(&m);
        assert_eq!(nav, Navigation::Root);

        let mut nav = Navigation::Expanded(CellId::main(2));
        nav.revalidate(&m);
        assert_eq!(nav, Navigation::Expanded(CellId::main(2)));
    }
}
