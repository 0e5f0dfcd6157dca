use std::error::Error;
use std::path::{Path, PathBuf};

use crate::ai::{HttpOptimizer, Optimizer};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::settings_io::{self, ModelEdit};
use crate::io::store::{FileStore, load_settings_or_default};
use crate::model::cell::{Cell, CellId, Field};
use crate::ops::cell_ops;
use crate::ops::export::{default_export_path, export_to_file};
use crate::ops::import::{import_text, read_import_file};
use crate::ops::workspace::Workspace;
use crate::parse::serialize_outline;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one subcommand against the data directory
pub fn dispatch(command: Commands, json: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    match command {
        // Read commands
        Commands::Show(args) => cmd_show(args, json, data_dir),
        Commands::Grid(args) => cmd_grid(args, json, data_dir),
        Commands::Export(args) => cmd_export(args, data_dir),

        // Write commands
        Commands::Import(args) => cmd_import(args, json, data_dir),
        Commands::Set(args) => cmd_set(args, data_dir),
        Commands::Clear(args) => cmd_clear(args, data_dir),
        Commands::Reset => cmd_reset(data_dir),

        // Settings
        Commands::Config(args) => cmd_config(args, json, data_dir),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_workspace(data_dir: &Path) -> Workspace {
    Workspace::load(Box::new(FileStore::new(data_dir)))
}

/// Surface a failed save as the command's error
fn finish(mut workspace: Workspace) -> Result<(), Box<dyn Error>> {
    match workspace.take_save_error() {
        Some(e) => Err(format!("could not save: {}", e).into()),
        None => Ok(()),
    }
}

fn find_cell<'a>(workspace: &'a Workspace, id: &str) -> Result<&'a Cell, Box<dyn Error>> {
    cell_ops::find_cell(workspace.mandala(), &CellId::from(id))
        .ok_or_else(|| format!("cell not found: {}", id).into())
}

/// Expand the grid of main cell `id`, or fail if it isn't one
fn expand(workspace: &mut Workspace, id: &str) -> Result<(), Box<dyn Error>> {
    if workspace.select(&CellId::from(id)) {
        Ok(())
    } else {
        Err(format!("not a main cell: {}", id).into())
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(args: ShowArgs, json: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let workspace = open_workspace(data_dir);
    let mandala = workspace.mandala();

    let cell = match &args.id {
        Some(id) => find_cell(&workspace, id)?,
        None => &mandala.root,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&cell_to_json(mandala, cell))?);
    } else if args.id.is_none() {
        print!("{}", serialize_outline(mandala));
    } else {
        for line in format_cell_detail(cell) {
            println!("{}", line);
        }
        for child in &cell.children {
            println!("  {}", format_cell_line(child));
        }
    }
    Ok(())
}

fn cmd_grid(args: GridArgs, json: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut workspace = open_workspace(data_dir);
    if let Some(id) = &args.id {
        expand(&mut workspace, id)?;
    }
    let cells = workspace.visible_cells();

    if json {
        println!("{}", serde_json::to_string_pretty(&grid_to_json(&cells))?);
    } else {
        for line in format_grid(&cells) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_export(args: ExportArgs, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let workspace = open_workspace(data_dir);

    let path = match args.output.as_deref() {
        Some("-") => {
            print!("{}", serialize_outline(workspace.mandala()));
            return Ok(());
        }
        Some(file) => PathBuf::from(file),
        None => default_export_path(&std::env::current_dir()?),
    };
    export_to_file(workspace.mandala(), &path)?;
    println!("exported to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_import(args: ImportArgs, json: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let store = FileStore::new(data_dir);
    let settings = load_settings_or_default(&store);
    let text = read_import_file(Path::new(&args.file))?;

    let optimizer = HttpOptimizer::new();
    let optimizer: Option<&dyn Optimizer> = if args.no_ai {
        None
    } else {
        Some(&optimizer)
    };
    let result = import_text(&text, &settings, optimizer)?;

    let mut workspace = open_workspace(data_dir);
    let summary = ImportJson {
        cells: result.mandala.cell_count(),
        rewritten: result.rewritten,
        dropped: result.dropped,
    };
    workspace.replace_tree(result.mandala);
    finish(workspace)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in &summary.dropped {
            eprintln!("warning: dropped heading: {}", line);
        }
        let how = if summary.rewritten { " (AI rewritten)" } else { "" };
        println!("imported {}{}", args.file, how);
    }
    Ok(())
}

fn cmd_set(args: SetArgs, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    if args.title.is_none() && args.content.is_none() {
        return Err("nothing to set: pass --title and/or --content".into());
    }
    let mut workspace = open_workspace(data_dir);
    find_cell(&workspace, &args.id)?;

    let id = CellId::from(args.id.as_str());
    if let Some(title) = &args.title {
        workspace.update_field(&id, Field::Title, title);
    }
    if let Some(content) = &args.content {
        workspace.update_field(&id, Field::Content, content);
    }
    finish(workspace)
}

fn cmd_clear(args: ClearArgs, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut workspace = open_workspace(data_dir);
    if args.all {
        workspace.clear_all();
    } else {
        if let Some(id) = &args.id {
            expand(&mut workspace, id)?;
        }
        workspace.clear_scope();
    }
    finish(workspace)
}

fn cmd_reset(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut workspace = open_workspace(data_dir);
    workspace.reset();
    finish(workspace)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, json: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let path = FileStore::new(data_dir).settings_path();
    match args.action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let (settings, _) = settings_io::read_settings(&path)?;
            let shown = redact_settings(&settings);
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                print!("{}", toml::to_string_pretty(&shown)?);
            }
        }
        ConfigAction::Set(set) => {
            let (settings, mut doc) = settings_io::read_settings(&path)?;
            let updated = settings_io::set_setting(&mut doc, &settings, &set.key, &set.value)?;
            settings_io::write_settings(&path, &doc)?;
            tracing::info!(key = %set.key, "updated setting");
            if updated.model != settings.model && set.key != "model" {
                println!("model reset to {}", updated.model);
            }
        }
        ConfigAction::AddModel(model) => {
            let (settings, mut doc) = settings_io::read_settings(&path)?;
            settings_io::edit_custom_models(&mut doc, &settings, ModelEdit::Add, &model.name)?;
            settings_io::write_settings(&path, &doc)?;
            tracing::info!(model = %model.name, "added custom model");
            println!("added model {}", model.name.trim());
        }
        ConfigAction::RemoveModel(model) => {
            let (settings, mut doc) = settings_io::read_settings(&path)?;
            let updated =
                settings_io::edit_custom_models(&mut doc, &settings, ModelEdit::Remove, &model.name)?;
            settings_io::write_settings(&path, &doc)?;
            tracing::info!(model = %model.name, "removed custom model");
            println!("removed model {}", model.name.trim());
            if updated.model != settings.model {
                println!("model reset to {}", updated.model);
            }
        }
        ConfigAction::Reset => {
            settings_io::reset_settings(&path)?;
            tracing::info!("restored default settings");
            println!("settings restored to defaults");
        }
    }
    Ok(())
}
