use crate::model::cell::{Cell, CellId, CellKind, Field};
use crate::model::mandala::Mandala;

/// Find a cell by id at any depth
pub fn find_cell<'a>(mandala: &'a Mandala, id: &CellId) -> Option<&'a Cell> {
    find_in(&mandala.root, id)
}

fn find_in<'a>(cell: &'a Cell, id: &CellId) -> Option<&'a Cell> {
    if cell.id == *id {
        return Some(cell);
    }
    cell.children.iter().find_map(|child| find_in(child, id))
}

/// Find a mutable cell by id at any depth
pub fn find_cell_mut<'a>(mandala: &'a mut Mandala, id: &CellId) -> Option<&'a mut Cell> {
    find_in_mut(&mut mandala.root, id)
}

fn find_in_mut<'a>(cell: &'a mut Cell, id: &CellId) -> Option<&'a mut Cell> {
    if cell.id == *id {
        return Some(cell);
    }
    cell.children
        .iter_mut()
        .find_map(|child| find_in_mut(child, id))
}

/// Set one text field on the cell with `id`, wherever it is nested.
/// Returns false (and leaves the tree untouched) when no cell has that id.
pub fn update_field(mandala: &mut Mandala, id: &CellId, field: Field, value: &str) -> bool {
    match find_cell_mut(mandala, id) {
        Some(cell) => {
            cell.set_field(field, value);
            tracing::debug!(cell = %id, %field, "updated cell field");
            true
        }
        None => {
            tracing::warn!(cell = %id, %field, "edit target not found; ignoring");
            false
        }
    }
}

/// Blank the text of one grid scope.
///
/// `None` clears the root grid: the center and the 8 main cells, leaving the
/// sub cells as they are. `Some(main)` clears that main cell and its 8
/// children. Returns false when the scope isn't the root grid or a main cell.
pub fn clear_subtree(mandala: &mut Mandala, scope: Option<&CellId>) -> bool {
    let Some(id) = scope else {
        mandala.root.clear_text();
        for main in &mut mandala.root.children {
            main.clear_text();
        }
        tracing::info!("cleared root grid");
        return true;
    };

    if mandala.kind_of(id) != Some(CellKind::Main) {
        tracing::warn!(cell = %id, "clear scope is not a main cell; ignoring");
        return false;
    }
    if let Some(main) = find_cell_mut(mandala, id) {
        main.clear_text();
        for sub in &mut main.children {
            sub.clear_text();
        }
    }
    tracing::info!(cell = %id, "cleared sub-grid");
    true
}

/// Blank the text of every cell in the tree
pub fn clear_all(mandala: &mut Mandala) {
    fn clear_rec(cell: &mut Cell) {
        cell.clear_text();
        for child in &mut cell.children {
            clear_rec(child);
        }
    }
    clear_rec(&mut mandala.root);
    tracing::info!("cleared every cell");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(m: &Mandala) -> Vec<(String, String)> {
        let mut out = Vec::new();
        fn walk(cell: &Cell, out: &mut Vec<(String, String)>) {
            out.push((cell.id.to_string(), cell.label.clone()));
            for c in &cell.children {
                walk(c, out);
            }
        }
        walk(&m.root, &mut out);
        out
    }

    #[test]
    fn update_field_reaches_every_depth() {
        let mut m = Mandala::blank();
        assert!(update_field(&mut m, &CellId::center(), Field::Title, "Root"));
        assert!(update_field(&mut m, &CellId::main(4), Field::Content, "main body"));
        assert!(update_field(&mut m, &CellId::sub(7, 7), Field::Title, "Last"));

        assert_eq!(m.root.title, "Root");
        assert_eq!(m.root.children[4].content, "main body");
        assert_eq!(m.root.children[7].children[7].title, "Last");
    }

    #[test]
    fn update_field_missing_id_is_noop() {
        let mut m = Mandala::placeholder();
        let before = m.clone();
        assert!(!update_field(&mut m, &CellId::new("ghost"), Field::Title, "x"));
        assert_eq!(m, before);
    }

    #[test]
    fn update_field_keeps_shape() {
        let mut m = Mandala::placeholder();
        let before = shape(&m);
        update_field(&mut m, &CellId::sub(2, 3), Field::Content, "new");
        assert_eq!(shape(&m), before);
        assert!(m.is_well_formed());
    }

    #[test]
    fn clear_root_scope_leaves_subs() {
        let mut m = Mandala::placeholder();
        assert!(clear_subtree(&mut m, None));
        assert_eq!(m.root.title, "");
        assert!(m.root.children.iter().all(|c| c.title.is_empty() && c.content.is_empty()));
        assert_eq!(m.root.children[0].children[0].title, "甲 idea 1");
    }

    #[test]
    fn clear_main_scope_clears_its_children_only() {
        let mut m = Mandala::placeholder();
        assert!(clear_subtree(&mut m, Some(&CellId::main(2))));
        let main = &m.root.children[2];
        assert_eq!(main.title, "");
        assert!(main.children.iter().all(|c| c.title.is_empty() && c.content.is_empty()));
        assert_eq!(m.root.title, "Central theme");
        assert_eq!(m.root.children[1].title, "Theme 2");
        assert_eq!(m.root.children[3].children[0].title, "丁 idea 1");
    }

    #[test]
    fn clear_with_non_main_scope_is_noop() {
        let mut m = Mandala::placeholder();
        let before = m.clone();
        assert!(!clear_subtree(&mut m, Some(&CellId::sub(0, 0))));
        assert!(!clear_subtree(&mut m, Some(&CellId::center())));
        assert!(!clear_subtree(&mut m, Some(&CellId::new("ghost"))));
        assert_eq!(m, before);
    }

    #[test]
    fn clear_all_blanks_everything() {
        let mut m = Mandala::placeholder();
        let before = shape(&m);
        clear_all(&mut m);
        assert_eq!(m, Mandala::blank());
        assert_eq!(shape(&m), before);
    }

    #[test]
    fn find_cell_by_id() {
        let m = Mandala::placeholder();
        assert_eq!(find_cell(&m, &CellId::main(1)).unwrap().title, "Theme 2");
        assert_eq!(find_cell(&m, &CellId::sub(1, 2)).unwrap().label, "C");
        assert!(find_cell(&m, &CellId::new("missing")).is_none());
    }
}
