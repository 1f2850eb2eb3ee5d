use comfy_table::{Cell, Color, Table};
use nu_ansi_term::Color as AnsiColor;
use rename_engine_core::Manager;

/// Render the manager's current item list as a table: original name, computed new
/// name (`-` when nothing matched), and whether it is actually eligible to commit
/// once the exclude/selection filters are applied.
pub fn render(manager: &Manager, use_color: bool) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Original").fg(Color::Cyan),
        Cell::new("New name").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
    ]);

    let flags = manager.get_flags();
    for index in 0..manager.get_item_count() {
        let Some(item) = manager.get_item_by_index(index) else {
            continue;
        };
        let will_rename = item.should_rename(flags, manager.root());
        let new_name = item.new_name();
        let new_name_display = new_name.as_deref().unwrap_or("-").to_string();
        let new_name_cell = if use_color && will_rename {
            AnsiColor::Green.paint(&new_name_display).to_string()
        } else {
            new_name_display
        };
        let status = if will_rename { "rename" } else { "unchanged" };

        table.add_row(vec![item.original_name().to_string(), new_name_cell, status.to_string()]);
    }

    table.to_string()
}
