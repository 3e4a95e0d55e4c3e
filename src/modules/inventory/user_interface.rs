use clap::{Arg, ArgMatches, Command};
use itertools::Itertools;

use super::model::{Category, ItemUpdate};
use super::store::InventoryStore;
use super::withdrawals::{register_withdrawal, WithdrawalStore};
use crate::modules::audit::store::AuditStore;
use crate::modules::auth::session::Session;
use crate::modules::backup::{export_csv, export_json, import_json};
use crate::modules::insights::{gather_insights, summarize, LocalAdvisor};
use crate::modules::utils::io::{confirm_destructive, prompt, read_line};
use crate::modules::utils::logging::log_store_operation;
use crate::modules::utils::time::format_for_display;

/// How the authenticated loop ended
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Logout,
    Exit,
}

fn command_grammar() -> Command {
    Command::new("stockroom")
        .about("Inventory commands")
        .no_binary_name(true)
        .subcommand(
            Command::new("list")
                .about("List inventory items")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Only show items in this category")
                        .value_name("CATEGORY"),
                )
                .arg(
                    Arg::new("low")
                        .long("low")
                        .help("Only show items at or below their minimum stock")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("add").about("Add a new default item (ADM)"))
        .subcommand(
            Command::new("edit")
                .about("Edit an item's fields (ADM)")
                .arg(Arg::new("id").help("The item id").required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an item (ADM)")
                .arg(Arg::new("id").help("The item id").required(true)),
        )
        .subcommand(Command::new("withdraw").about("Record a withdrawal"))
        .subcommand(Command::new("history").about("Show the withdrawal history"))
        .subcommand(Command::new("logs").about("Show the audit log (ADM)"))
        .subcommand(
            Command::new("export")
                .about("Export the inventory to a file")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help("Output format: json or csv")
                        .value_name("FORMAT")
                        .default_value("json"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .help("Destination path")
                        .value_name("PATH"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Replace the inventory from a JSON export (ADM)")
                .arg(Arg::new("path").help("The JSON file to read").required(true)),
        )
        .subcommand(Command::new("insights").about("Show inventory insights"))
        .subcommand(Command::new("whoami").about("Show the active session"))
        .subcommand(Command::new("logout").about("End the session"))
        .subcommand(Command::new("exit").about("Quit the program"))
}

/// The authenticated command loop. Stays here until logout or exit; ADM
/// gating happens per command.
pub fn run_session(
    session: &Session,
    items: &mut InventoryStore,
    withdrawals: &mut WithdrawalStore,
    audit: &mut AuditStore,
) -> SessionEnd {
    println!("\nType 'help' to see available commands.");

    loop {
        println!("\nEnter command (or 'help' for available commands):");
        let input = match read_line() {
            Ok(input) => input,
            Err(_) => continue,
        };

        let args = input.split_whitespace().collect::<Vec<_>>();
        if args.is_empty() {
            continue;
        }

        if args[0].eq_ignore_ascii_case("help") {
            show_help();
            continue;
        }

        let matches = match command_grammar().try_get_matches_from(args.iter().copied()) {
            Ok(matches) => matches,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match matches.subcommand() {
            Some(("list", sub)) => handle_list(sub, items),
            Some(("add", _)) => handle_add(session, items, audit),
            Some(("edit", sub)) => handle_edit(sub, session, items, audit),
            Some(("delete", sub)) => handle_delete(sub, session, items, audit),
            Some(("withdraw", _)) => handle_withdraw(session, items, withdrawals, audit),
            Some(("history", _)) => handle_history(withdrawals),
            Some(("logs", _)) => handle_logs(session, audit),
            Some(("export", sub)) => handle_export(sub, session, items, audit),
            Some(("import", sub)) => handle_import(sub, session, items, audit),
            Some(("insights", _)) => handle_insights(items),
            Some(("whoami", _)) => {
                println!("Logged in as {} ({})", session.username, session.role)
            }
            Some(("logout", _)) => return SessionEnd::Logout,
            Some(("exit", _)) => return SessionEnd::Exit,
            _ => println!("Unknown command. Type 'help' for available commands."),
        }
    }
}

fn show_help() {
    println!("\nAvailable commands:");
    println!("  list [--category C] [--low]   List items, optionally filtered");
    println!("  add                           Add a new default item (ADM)");
    println!("  edit <id>                     Edit an item interactively (ADM)");
    println!("  delete <id>                   Delete an item (ADM)");
    println!("  withdraw                      Record a withdrawal");
    println!("  history                       Show the withdrawal history");
    println!("  logs                          Show the audit log (ADM)");
    println!("  export [--format json|csv] [--output PATH]");
    println!("  import <path>                 Replace inventory from a JSON export (ADM)");
    println!("  insights                      Show inventory insights");
    println!("  whoami / logout / exit");
}

fn require_admin(session: &Session) -> bool {
    if session.role.can_mutate_inventory() {
        true
    } else {
        println!("Only ADM accounts can do that. You are logged in as {}.", session.role);
        false
    }
}

fn handle_list(sub: &ArgMatches, items: &InventoryStore) {
    let category = sub
        .get_one::<String>("category")
        .and_then(|raw| match Category::parse(raw) {
            Some(category) => Some(category),
            None => {
                println!("Unknown category '{}'.", raw);
                None
            }
        });
    let low_only = sub.get_flag("low");

    let visible = items
        .items()
        .iter()
        .filter(|item| category.map_or(true, |c| item.category == c))
        .filter(|item| !low_only || item.is_low_stock())
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .collect::<Vec<_>>();

    if visible.is_empty() {
        println!("No items to show.");
        return;
    }

    println!(
        "\n{:<10} {:<28} {:>8} {:>9} {:<6} {:<14} {}",
        "ID", "Material", "Qty", "Min", "Unit", "Category", "Last updated"
    );
    for item in visible {
        let marker = if item.is_low_stock() { " (LOW)" } else { "" };
        println!(
            "{:<10} {:<28} {:>8} {:>9} {:<6} {:<14} {}{}",
            item.id,
            item.name,
            item.quantity,
            item.min_stock,
            item.unit,
            item.category,
            format_for_display(item.last_updated),
            marker
        );
    }
}

fn handle_add(session: &Session, items: &mut InventoryStore, audit: &mut AuditStore) {
    if !require_admin(session) {
        return;
    }

    match items.add_default() {
        Ok(item) => {
            log_store_operation("add_item", &session.username, "inventory", true, None);
            if let Err(e) = audit.record(
                session,
                "add_item",
                &format!("created item {} '{}'", item.id, item.name),
            ) {
                println!("Warning: could not write audit entry: {}", e);
            }
            println!("Item added with id {}. Use 'edit {}' to fill it in.", item.id, item.id);
        }
        Err(e) => {
            log_store_operation("add_item", &session.username, "inventory", false, None);
            println!("Error adding item: {}", e);
        }
    }
}

/// Prompt for each field, Enter keeping the current value
fn prompt_item_update(items: &InventoryStore, id: &str) -> Option<ItemUpdate> {
    let item = items.get(id)?;

    println!("\nEditing {} '{}'. Press Enter to keep a field.", item.id, item.name);
    let mut update = ItemUpdate::default();

    if let Ok(name) = prompt(&format!("Name [{}]", item.name)) {
        if !name.is_empty() {
            update.name = Some(name);
        }
    }

    if let Ok(raw) = prompt(&format!("Quantity [{}]", item.quantity)) {
        if !raw.is_empty() {
            match raw.parse::<u32>() {
                Ok(quantity) => update.quantity = Some(quantity),
                Err(_) => println!("Invalid quantity. Keeping current."),
            }
        }
    }

    if let Ok(raw) = prompt(&format!("Minimum stock [{}]", item.min_stock)) {
        if !raw.is_empty() {
            match raw.parse::<u32>() {
                Ok(min_stock) => update.min_stock = Some(min_stock),
                Err(_) => println!("Invalid minimum stock. Keeping current."),
            }
        }
    }

    let category_options = Category::ALL.iter().map(|c| c.label()).join("/");
    if let Ok(raw) = prompt(&format!("Category [{}] ({})", item.category, category_options)) {
        if !raw.is_empty() {
            match Category::parse(&raw) {
                Some(category) => update.category = Some(category),
                None => println!("Unknown category. Keeping current."),
            }
        }
    }

    if let Ok(unit) = prompt(&format!("Unit [{}]", item.unit)) {
        if !unit.is_empty() {
            update.unit = Some(unit);
        }
    }

    Some(update)
}

fn handle_edit(
    sub: &ArgMatches,
    session: &Session,
    items: &mut InventoryStore,
    audit: &mut AuditStore,
) {
    if !require_admin(session) {
        return;
    }

    let id = match sub.get_one::<String>("id") {
        Some(id) => id.clone(),
        None => return,
    };

    let update = match prompt_item_update(items, &id) {
        Some(update) => update,
        None => {
            println!("Item not found: {}", id);
            return;
        }
    };
    if update.is_empty() {
        println!("Nothing to change.");
        return;
    }

    match items.update(&id, &update) {
        Ok(changes) if changes.is_empty() => println!("No fields changed."),
        Ok(changes) => {
            let details = changes.join("; ");
            log_store_operation("update_item", &session.username, "inventory", true, None);
            if let Err(e) = audit.record(session, "update_item", &details) {
                println!("Warning: could not write audit entry: {}", e);
            }
            println!("Item updated: {}", details);
        }
        Err(e) => {
            log_store_operation("update_item", &session.username, "inventory", false, None);
            println!("Error updating item: {}", e);
        }
    }
}

fn handle_delete(
    sub: &ArgMatches,
    session: &Session,
    items: &mut InventoryStore,
    audit: &mut AuditStore,
) {
    if !require_admin(session) {
        return;
    }

    let id = match sub.get_one::<String>("id") {
        Some(id) => id.clone(),
        None => return,
    };
    let name = match items.get(&id) {
        Some(item) => item.name.clone(),
        None => {
            println!("Item not found: {}", id);
            return;
        }
    };

    match confirm_destructive(&format!("Really delete '{}'?", name)) {
        Ok(true) => {}
        _ => {
            println!("Deletion cancelled.");
            return;
        }
    }

    match items.delete(&id) {
        Ok(removed) => {
            log_store_operation("delete_item", &session.username, "inventory", true, None);
            if let Err(e) = audit.record(
                session,
                "delete_item",
                &format!("removed item {} '{}'", removed.id, removed.name),
            ) {
                println!("Warning: could not write audit entry: {}", e);
            }
            println!("Item deleted: {}", removed.name);
        }
        Err(e) => println!("Error deleting item: {}", e),
    }
}

fn handle_withdraw(
    session: &Session,
    items: &mut InventoryStore,
    withdrawals: &mut WithdrawalStore,
    audit: &mut AuditStore,
) {
    if items.is_empty() {
        println!("No items available to withdraw.");
        return;
    }

    println!("\nAvailable items:");
    for item in items.items() {
        println!("  {}  {} ({} {} available)", item.id, item.name, item.quantity, item.unit);
    }

    let id = prompt("Item id").unwrap_or_default();
    if id.is_empty() {
        println!("Withdrawal cancelled.");
        return;
    }
    let withdrawn_by = prompt("Who is withdrawing").unwrap_or_default();
    let quantity = match prompt("Quantity").unwrap_or_default().parse::<u32>() {
        Ok(quantity) => quantity,
        Err(_) => {
            println!("Invalid quantity.");
            return;
        }
    };

    match register_withdrawal(items, withdrawals, &id, &withdrawn_by, quantity) {
        Ok(record) => {
            log_store_operation("withdraw", &session.username, "withdrawals", true, None);
            if let Err(e) = audit.record(
                session,
                "register_withdrawal",
                &format!(
                    "{} withdrew {} x '{}'",
                    record.withdrawn_by, record.quantity, record.item_name
                ),
            ) {
                println!("Warning: could not write audit entry: {}", e);
            }
            let remaining = items.get(&id).map(|i| i.quantity).unwrap_or(0);
            println!("Withdrawal recorded. {} left in stock.", remaining);
        }
        Err(e) => {
            log_store_operation("withdraw", &session.username, "withdrawals", false, None);
            println!("{}", e);
        }
    }
}

fn handle_history(withdrawals: &WithdrawalStore) {
    if withdrawals.is_empty() {
        println!("No withdrawals recorded yet.");
        return;
    }

    println!(
        "\n{:<20} {:<28} {:>5} {}",
        "Withdrawn by", "Material", "Qty", "When"
    );
    // Newest first
    for record in withdrawals.records().iter().rev() {
        println!(
            "{:<20} {:<28} {:>5} {}",
            record.withdrawn_by,
            record.item_name,
            record.quantity,
            format_for_display(record.timestamp)
        );
    }
}

fn handle_logs(session: &Session, audit: &AuditStore) {
    if !session.role.can_view_audit_log() {
        println!("Only ADM accounts can view the audit log.");
        return;
    }
    if audit.is_empty() {
        println!("No actions recorded yet.");
        return;
    }

    println!(
        "\n{:<16} {:<8} {:<20} {:<40} {}",
        "User", "Role", "Action", "Details", "When"
    );
    for entry in audit.entries().iter().rev() {
        println!(
            "{:<16} {:<8} {:<20} {:<40} {}",
            entry.user,
            entry.role.to_string(),
            entry.action,
            entry.details,
            format_for_display(entry.timestamp)
        );
    }
}

fn handle_export(
    sub: &ArgMatches,
    session: &Session,
    items: &InventoryStore,
    audit: &mut AuditStore,
) {
    let format = sub
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json");
    let default_name = match format {
        "csv" => "inventory_export.csv",
        _ => "inventory_export.json",
    };
    let path = sub
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| default_name.to_string());

    let result = match format {
        "json" => export_json(items.items(), &path),
        "csv" => export_csv(items.items(), &path),
        other => {
            println!("Unknown format '{}'. Use json or csv.", other);
            return;
        }
    };

    match result {
        Ok(()) => {
            log_store_operation("export", &session.username, "inventory", true, Some(format));
            if let Err(e) = audit.record(
                session,
                "export",
                &format!("exported {} items as {} to {}", items.len(), format, path),
            ) {
                println!("Warning: could not write audit entry: {}", e);
            }
            println!("Exported {} items to {}.", items.len(), path);
        }
        Err(e) => {
            log_store_operation("export", &session.username, "inventory", false, Some(format));
            println!("Export failed: {}", e);
        }
    }
}

fn handle_import(
    sub: &ArgMatches,
    session: &Session,
    items: &mut InventoryStore,
    audit: &mut AuditStore,
) {
    if !require_admin(session) {
        return;
    }

    let path = match sub.get_one::<String>("path") {
        Some(path) => path.clone(),
        None => return,
    };

    let imported = match import_json(&path) {
        Ok(imported) => imported,
        Err(e) => {
            // Import aborts whole: nothing was written
            log_store_operation("import", &session.username, "inventory", false, None);
            println!("Import failed: {}", e);
            return;
        }
    };

    match items.import(imported) {
        Ok(count) => {
            log_store_operation("import", &session.username, "inventory", true, None);
            if let Err(e) = audit.record(
                session,
                "import",
                &format!("imported {} items from {}", count, path),
            ) {
                println!("Warning: could not write audit entry: {}", e);
            }
            println!("Imported {} items.", count);
        }
        Err(e) => println!("Import failed: {}", e),
    }
}

fn handle_insights(items: &InventoryStore) {
    let insights = gather_insights(&LocalAdvisor, &summarize(items.items()));
    println!("\nInventory insights:");
    for insight in insights {
        println!("  [{:?}] {}: {}", insight.priority, insight.title, insight.description);
    }
}
