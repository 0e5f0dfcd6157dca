use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::ai::{AiError, HttpOptimizer, Optimizer};
use crate::io::store::{FileStore, load_settings_or_default};
use crate::model::cell::{Cell, CellId, Field};
use crate::model::mandala::{GRID_SLOTS, Mandala, slot_at};
use crate::model::settings::Settings;
use crate::ops::export::{default_export_path, export_to_file};
use crate::ops::import::{ImportError, ImportResult, parse_import, read_import_file};
use crate::ops::navigation::DisplayMode;
use crate::ops::workspace::Workspace;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Inline edit of one field; the session lives in the workspace editor
    Edit,
    /// Typing the path of a file to import
    Prompt,
    /// Waiting for y/n on a destructive action
    Confirm,
    /// AI rewrite in flight; input is ignored
    Loading,
}

/// Destructive actions that need confirming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Clear the grid on screen
    ClearScope,
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// An import waiting on the AI worker thread
pub struct PendingImport {
    pub path: PathBuf,
    rx: Receiver<Result<String, AiError>>,
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    pub settings: Settings,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_help: bool,
    /// Cursor in the nine-cell grid, (row, col) in 0..3
    pub cursor: (usize, usize),
    /// Cursor in the overview, (row, col) in 0..9
    pub overview_cursor: (usize, usize),
    /// Text being edited in `Mode::Edit`
    pub edit_buffer: String,
    /// Byte offset of the edit cursor in `edit_buffer`
    pub edit_cursor: usize,
    /// Path typed in `Mode::Prompt`
    pub prompt_input: String,
    pub confirm: Option<ConfirmAction>,
    pub status: Option<StatusMessage>,
    /// Full text of the last import error when it spans several lines
    pub import_detail: Option<String>,
    /// Where exports are written
    pub export_dir: PathBuf,
    pub pending_import: Option<PendingImport>,
    optimizer: Arc<dyn Optimizer>,
}

/// The cell shown at overview position (row, col) in 0..9. The middle block
/// is the root grid; each outer block is the grid of the main cell whose slot
/// it occupies.
pub fn overview_cell(mandala: &Mandala, row: usize, col: usize) -> Option<&Cell> {
    let block = slot_at(row / 3, col / 3)?;
    let inner = slot_at(row % 3, col % 3)?;
    let center = match block {
        0 => &mandala.root,
        k => mandala.root.children.get(k - 1)?,
    };
    match inner {
        0 => Some(center),
        k => center.children.get(k - 1),
    }
}

impl App {
    pub fn new(
        workspace: Workspace,
        settings: Settings,
        optimizer: Arc<dyn Optimizer>,
        export_dir: PathBuf,
    ) -> Self {
        let theme = Theme::from_config(&settings.ui);
        App {
            workspace,
            settings,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            show_help: false,
            cursor: (1, 1),
            overview_cursor: (4, 4),
            edit_buffer: String::new(),
            edit_cursor: 0,
            prompt_input: String::new(),
            confirm: None,
            status: None,
            import_detail: None,
            export_dir,
            pending_import: None,
            optimizer,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Surface a failed save in the status row
    fn check_save(&mut self) {
        if let Some(e) = self.workspace.take_save_error() {
            self.set_error(format!("Save failed: {e}"));
        }
    }

    /// Grid slot under the cursor (0 = center)
    pub fn cursor_slot(&self) -> usize {
        slot_at(self.cursor.0, self.cursor.1).unwrap_or(0)
    }

    /// The cell under the cursor in the current display mode
    pub fn cursor_cell(&self) -> Option<&Cell> {
        match self.workspace.display() {
            DisplayMode::Grid => self.workspace.visible_cells().get(self.cursor_slot()).copied(),
            DisplayMode::Overview => {
                let (row, col) = self.overview_cursor;
                overview_cell(self.workspace.mandala(), row, col)
            }
        }
    }

    pub fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let (cursor, max) = match self.workspace.display() {
            DisplayMode::Grid => (&mut self.cursor, 2),
            DisplayMode::Overview => (&mut self.overview_cursor, 8),
        };
        cursor.0 = cursor.0.saturating_add_signed(d_row).min(max);
        cursor.1 = cursor.1.saturating_add_signed(d_col).min(max);
    }

    // Navigation

    /// Enter on the cursor cell: expand, collapse, or (in the overview) open
    /// the grid holding that cell.
    pub fn activate_cursor(&mut self) {
        match self.workspace.display() {
            DisplayMode::Grid => {
                if self.workspace.activate(self.cursor_slot()) {
                    self.cursor = (1, 1);
                }
            }
            DisplayMode::Overview => {
                let (row, col) = self.overview_cursor;
                let block = slot_at(row / 3, col / 3).unwrap_or(0);
                let inner = slot_at(row % 3, col % 3).unwrap_or(0);
                let main_slot = if block == 0 { inner } else { block };
                let mandala = self.workspace.mandala();
                let target = match main_slot {
                    0 => Some(mandala.root.id.clone()),
                    k => mandala.root.children.get(k - 1).map(|c| c.id.clone()),
                };
                let Some(target) = target else {
                    return;
                };
                self.workspace.overview_select(&target);
                self.cursor = (1, 1);
            }
        }
    }

    /// Back to the root grid
    pub fn go_to_parent(&mut self) {
        match self.workspace.display() {
            DisplayMode::Grid => self.workspace.collapse(),
            DisplayMode::Overview => self.workspace.navigate_to_parent(),
        }
        self.cursor = (1, 1);
    }

    pub fn toggle_overview(&mut self) {
        let expanded_slot = self
            .workspace
            .navigation()
            .expanded()
            .and_then(|id| self.workspace.mandala().main_index(id))
            .map_or(0, |i| i + 1);
        if self.workspace.toggle_display() == DisplayMode::Overview {
            let (block_row, block_col) = GRID_SLOTS[expanded_slot];
            self.overview_cursor = (block_row * 3 + self.cursor.0, block_col * 3 + self.cursor.1);
        }
    }

    // Editing

    pub fn begin_edit(&mut self, field: Field) {
        let Some((id, text)) = self
            .cursor_cell()
            .map(|cell| (cell.id.clone(), cell.field(field).to_string()))
        else {
            return;
        };
        self.edit_buffer = text;
        self.edit_cursor = self.edit_buffer.len();
        self.workspace.begin_edit(id, field);
        self.mode = Mode::Edit;
    }

    /// The (cell, field) being edited, if any
    pub fn edit_target(&self) -> Option<(CellId, Field)> {
        self.workspace
            .editor()
            .session()
            .map(|s| (s.cell_id.clone(), s.field))
    }

    pub fn commit_edit(&mut self) {
        if let Some((id, field)) = self.edit_target() {
            let value = std::mem::take(&mut self.edit_buffer);
            self.workspace.commit_edit(&id, field, &value);
            self.check_save();
        }
        self.edit_cursor = 0;
        self.mode = Mode::Navigate;
    }

    pub fn cancel_edit(&mut self) {
        self.workspace.cancel_edit();
        self.edit_buffer.clear();
        self.edit_cursor = 0;
        self.mode = Mode::Navigate;
    }

    // Export / import

    pub fn export(&mut self) {
        let path = default_export_path(&self.export_dir);
        match export_to_file(self.workspace.mandala(), &path) {
            Ok(()) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.set_error(format!("Export failed: {e}"));
            }
        }
    }

    pub fn open_import_prompt(&mut self, prefill: &str) {
        self.prompt_input = prefill.to_string();
        self.mode = Mode::Prompt;
    }

    pub fn close_import_prompt(&mut self) {
        self.prompt_input.clear();
        self.import_detail = None;
        self.mode = Mode::Navigate;
    }

    /// Start importing the file named in the prompt. With AI enabled the
    /// rewrite runs on a worker thread and the app waits in `Mode::Loading`.
    pub fn start_import(&mut self) {
        self.import_detail = None;
        let input = self.prompt_input.trim().to_string();
        if input.is_empty() {
            self.mode = Mode::Navigate;
            return;
        }
        let path = PathBuf::from(&input);
        let text = match read_import_file(&path) {
            Ok(text) => text,
            Err(e) => {
                self.fail_import(&path, e);
                return;
            }
        };

        if !self.settings.ai_enabled {
            let result = parse_import(&text, false);
            self.finish_import(&path, result);
            return;
        }

        let (tx, rx) = mpsc::channel();
        let optimizer = Arc::clone(&self.optimizer);
        let settings = self.settings.clone();
        thread::spawn(move || {
            let _ = tx.send(optimizer.optimize(&text, &settings));
        });
        tracing::info!(path = %path.display(), "waiting for AI rewrite");
        self.pending_import = Some(PendingImport { path, rx });
        self.mode = Mode::Loading;
    }

    /// Check on the AI worker. Returns true when a pending import finished.
    pub fn poll_import(&mut self) -> bool {
        let Some(pending) = &self.pending_import else {
            return false;
        };
        let outcome = match pending.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(AiError::Transport("AI worker stopped without answering".into()))
            }
        };
        let Some(PendingImport { path, .. }) = self.pending_import.take() else {
            return false;
        };
        let result = outcome
            .map_err(ImportError::from)
            .and_then(|text| parse_import(&text, true));
        self.finish_import(&path, result);
        true
    }

    fn finish_import(&mut self, path: &Path, result: Result<ImportResult, ImportError>) {
        match result {
            Ok(imported) => {
                self.workspace.replace_tree(imported.mandala);
                self.cursor = (1, 1);
                self.mode = Mode::Navigate;
                let mut msg = format!("Imported {}", path.display());
                if imported.rewritten {
                    msg.push_str(" (AI rewritten)");
                }
                if !imported.dropped.is_empty() {
                    msg.push_str(&format!("; {} extra headings dropped", imported.dropped.len()));
                }
                self.set_status(msg);
                self.check_save();
            }
            Err(e) => self.fail_import(path, e),
        }
    }

    /// Report the failure and reopen the prompt on the same path
    fn fail_import(&mut self, path: &Path, e: ImportError) {
        tracing::warn!(path = %path.display(), error = %e, "import failed");
        let message = e.to_string();
        let first_line = message.lines().next().unwrap_or_default();
        self.set_error(format!("Import failed: {first_line}"));
        self.import_detail = message.contains('\n').then_some(message);
        self.open_import_prompt(&path.display().to_string());
    }

    // Clearing

    pub fn ask_confirm(&mut self, action: ConfirmAction) {
        self.confirm = Some(action);
        self.mode = Mode::Confirm;
    }

    pub fn resolve_confirm(&mut self, accepted: bool) {
        let action = self.confirm.take();
        self.mode = Mode::Navigate;
        if !accepted {
            return;
        }
        match action {
            Some(ConfirmAction::ClearScope) => {
                if self.workspace.clear_scope() {
                    self.set_status("Cleared grid");
                }
            }
            Some(ConfirmAction::ClearAll) => {
                self.workspace.clear_all();
                self.set_status("Cleared every cell");
            }
            None => {}
        }
        self.check_save();
    }
}

/// Run the TUI against the data directory
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(data_dir);
    let settings = load_settings_or_default(&store);
    let workspace = Workspace::load(Box::new(store));
    let export_dir = std::env::current_dir()?;
    let mut app = App::new(workspace, settings, Arc::new(HttpOptimizer::new()), export_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        app.poll_import();

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::ops::navigation::Navigation;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    struct Fixed(Result<String, AiError>);

    impl Optimizer for Fixed {
        fn optimize(&self, _text: &str, _settings: &Settings) -> Result<String, AiError> {
            self.0.clone()
        }
    }

    fn app_with(settings: Settings, optimizer: Fixed, dir: &Path) -> App {
        let workspace = Workspace::new(Mandala::placeholder(), Box::new(MemoryStore::default()));
        App::new(workspace, settings, Arc::new(optimizer), dir.to_path_buf())
    }

    fn wait_for_import(app: &mut App) {
        let start = Instant::now();
        while !app.poll_import() {
            assert!(start.elapsed() < Duration::from_secs(5), "import never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn ai_on() -> Settings {
        Settings {
            ai_enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn overview_cell_layout() {
        let m = Mandala::placeholder();
        assert_eq!(overview_cell(&m, 4, 4).unwrap().id, CellId::center());
        // Middle block, bottom-middle slot is the first main cell
        assert_eq!(overview_cell(&m, 5, 4).unwrap().id, CellId::main(0));
        // Bottom-middle block is the first main cell's grid
        assert_eq!(overview_cell(&m, 7, 4).unwrap().id, CellId::main(0));
        assert_eq!(overview_cell(&m, 8, 4).unwrap().id, CellId::sub(0, 0));
        // Top-left block is the sixth main cell; its top-left slot is its sixth sub
        assert_eq!(overview_cell(&m, 0, 0).unwrap().id, CellId::sub(5, 5));
        assert!(overview_cell(&m, 9, 0).is_none());
    }

    #[test]
    fn enter_expands_and_center_collapses() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.cursor = (1, 0); // slot 2
        app.activate_cursor();
        assert_eq!(
            app.workspace.navigation(),
            &Navigation::Expanded(CellId::main(1))
        );
        assert_eq!(app.cursor, (1, 1));
        app.activate_cursor();
        assert_eq!(app.workspace.navigation(), &Navigation::Root);
    }

    #[test]
    fn overview_enter_opens_block() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.toggle_overview();
        assert_eq!(app.workspace.display(), DisplayMode::Overview);
        app.overview_cursor = (0, 8); // top-right block: slot 7
        app.activate_cursor();
        assert_eq!(app.workspace.display(), DisplayMode::Grid);
        assert_eq!(
            app.workspace.navigation(),
            &Navigation::Expanded(CellId::main(6))
        );
    }

    #[test]
    fn edit_commit_and_cancel() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.begin_edit(Field::Title);
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.edit_buffer, "Central theme");
        app.edit_buffer = "Life goals".into();
        app.commit_edit();
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.workspace.mandala().root.title, "Life goals");
        let saved = app.workspace.store().load_tree().unwrap().unwrap();
        assert_eq!(saved.root.title, "Life goals");

        app.begin_edit(Field::Content);
        app.edit_buffer = "discarded".into();
        app.cancel_edit();
        assert_eq!(app.workspace.mandala().root.content, "What this mandala is about");
        assert!(app.workspace.editor().session().is_none());
    }

    #[test]
    fn export_writes_dated_file() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.export();
        let files: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert!(!app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn plain_import_replaces_tree() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("in.md");
        fs::write(&file, "# Center\nC\n\n## M1\nM1c\n\n### S1\nS1c").unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.open_import_prompt(&file.display().to_string());
        app.start_import();
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.workspace.mandala().root.title, "Center");
        assert_eq!(app.workspace.mandala().cell_count(), 73);
    }

    #[test]
    fn ai_import_runs_on_worker() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("in.md");
        fs::write(&file, "rough notes").unwrap();
        let mut app = app_with(ai_on(), Fixed(Ok("# Polished".into())), tmp.path());
        app.open_import_prompt(&file.display().to_string());
        app.start_import();
        assert_eq!(app.mode, Mode::Loading);
        wait_for_import(&mut app);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.workspace.mandala().root.title, "Polished");
        assert!(app.status.as_ref().unwrap().text.contains("AI rewritten"));
    }

    #[test]
    fn ai_failure_reopens_prompt_with_same_path() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("in.md");
        fs::write(&file, "# Mine").unwrap();
        let mut app = app_with(ai_on(), Fixed(Err(AiError::RateLimited)), tmp.path());
        app.open_import_prompt(&file.display().to_string());
        app.start_import();
        wait_for_import(&mut app);
        assert_eq!(app.mode, Mode::Prompt);
        assert_eq!(app.prompt_input, file.display().to_string());
        assert_eq!(app.workspace.mandala(), &Mandala::placeholder());
        let status = app.status.as_ref().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("too many requests"));
    }

    #[test]
    fn parse_failure_keeps_expected_format() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("in.md");
        fs::write(&file, "just some notes").unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.open_import_prompt(&file.display().to_string());
        app.start_import();
        assert_eq!(app.mode, Mode::Prompt);
        let detail = app.import_detail.as_deref().unwrap();
        assert!(detail.contains("no center theme found"));
        assert!(detail.contains("## 甲 Theme 1"));

        app.close_import_prompt();
        assert!(app.import_detail.is_none());
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn missing_file_reopens_prompt() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.open_import_prompt("/no/such/file.md");
        app.start_import();
        assert_eq!(app.mode, Mode::Prompt);
        assert_eq!(app.prompt_input, "/no/such/file.md");
    }

    #[test]
    fn clear_needs_confirmation() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(Settings::default(), Fixed(Ok(String::new())), tmp.path());
        app.ask_confirm(ConfirmAction::ClearAll);
        app.resolve_confirm(false);
        assert_eq!(app.workspace.mandala(), &Mandala::placeholder());

        app.ask_confirm(ConfirmAction::ClearAll);
        app.resolve_confirm(true);
        assert_eq!(app.workspace.mandala(), &Mandala::blank());
        assert_eq!(app.mode, Mode::Navigate);
    }
}
