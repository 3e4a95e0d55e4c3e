use super::accounts::{AccountStore, RegistrationForm};
use super::flow::{AuthFlow, AuthState, DeleteOutcome};
use super::password::read_password;
use super::session::Session;
use crate::modules::utils::io::{confirm_destructive, prompt, read_line};
use crate::modules::utils::logging::log_auth_event;

/// Function to show initial options when starting the program
fn show_initial_options() {
    println!("\n=== Stockroom ===");
    println!("1. Login                  (or type 'login')");
    println!("2. Register new account   (or type 'register')");
    println!("3. Forgot password        (or type 'forgot')");
    println!("4. Delete my account      (or type 'delete')");
    println!("5. Exit                   (or type 'exit')");
    println!("\nEnter your choice         (1-5 or command):");
}

/// Drive the auth flow state machine interactively. Returns the session on
/// a successful login, or `None` when the user chooses to exit.
pub fn run_auth_flow(store: &mut AccountStore, admin_key: Option<&str>) -> Option<Session> {
    let mut flow = AuthFlow::new();

    loop {
        match flow.state().clone() {
            AuthState::Login => {
                show_initial_options();
                let choice = match read_line() {
                    Ok(input) => input,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };

                match choice.as_str() {
                    "1" | "login" => {
                        if let Some(session) = handle_login(&flow, store) {
                            return Some(session);
                        }
                    }
                    "2" | "register" => flow.goto_register(),
                    "3" | "forgot" => flow.goto_forgot(),
                    "4" | "delete" => flow.goto_delete_account(),
                    "5" | "exit" | "quit" => {
                        println!("Goodbye!");
                        return None;
                    }
                    _ => println!(
                        "Invalid choice. Enter a number (1-5) or a command (login/register/forgot/delete/exit)."
                    ),
                }
            }
            AuthState::Register => handle_register(&mut flow, store, admin_key),
            AuthState::Forgot => handle_forgot(&mut flow, store),
            AuthState::Reset { question, .. } => handle_reset(&mut flow, store, &question),
            AuthState::DeleteAccount => handle_delete(&mut flow, store),
        }
    }
}

fn handle_login(flow: &AuthFlow, store: &AccountStore) -> Option<Session> {
    let username = prompt("Username").ok()?;
    println!("Password:");
    let password = read_password().ok()?;

    match flow.submit_login(store, &username, &password) {
        Ok(session) => {
            log_auth_event("login", &session.username, true, None);
            println!("\nWelcome, {}! ({})", session.username, session.role);
            Some(session)
        }
        Err(e) => {
            log_auth_event("login", &username, false, Some(&e.to_string()));
            println!("\n{}", e);
            None
        }
    }
}

fn handle_register(flow: &mut AuthFlow, store: &mut AccountStore, admin_key: Option<&str>) {
    println!("\n=== Register new account === (leave username empty to go back)");
    let username = match prompt("Username") {
        Ok(input) => input,
        Err(_) => return,
    };
    if username.is_empty() {
        flow.back_to_login();
        return;
    }

    println!("Password (minimum 4 characters):");
    let password = read_password().unwrap_or_default();
    println!("Repeat password:");
    let confirm_password = read_password().unwrap_or_default();

    let security_question = prompt("Security question (e.g. your pet's name?)").unwrap_or_default();
    let security_answer = prompt("Security answer").unwrap_or_default();

    println!("Admin key (leave blank to register as a visitor):");
    let supplied_admin_key = read_password().unwrap_or_default();

    let form = RegistrationForm {
        username,
        password,
        confirm_password,
        security_question,
        security_answer,
        admin_key: supplied_admin_key,
    };

    match flow.submit_registration(store, &form, admin_key) {
        Ok(account) => {
            log_auth_event("register", &account.username, true, None);
            println!("\nRegistration complete! You can now log in as {}.", account.role);
        }
        Err(e) => {
            log_auth_event("register", &form.username, false, Some(&e.to_string()));
            println!("\nRegistration failed: {}", e);
        }
    }
}

fn handle_forgot(flow: &mut AuthFlow, store: &AccountStore) {
    println!("\n=== Password recovery === (leave username empty to go back)");
    let username = match prompt("Username") {
        Ok(input) => input,
        Err(_) => return,
    };
    if username.is_empty() {
        flow.back_to_login();
        return;
    }

    if let Err(e) = flow.submit_forgot(store, &username) {
        log_auth_event("forgot_password", &username, false, Some(&e.to_string()));
        println!("\n{}", e);
    }
}

fn handle_reset(flow: &mut AuthFlow, store: &mut AccountStore, question: &str) {
    println!("\nSecurity question: \"{}\"", question);
    let answer = prompt("Answer").unwrap_or_default();
    println!("New password:");
    let new_password = read_password().unwrap_or_default();
    println!("Repeat new password:");
    let confirm_password = read_password().unwrap_or_default();

    match flow.submit_reset(store, &answer, &new_password, &confirm_password) {
        Ok(()) => {
            log_auth_event("password_reset", "-", true, None);
            println!("\nPassword reset successfully! You can now log in.");
        }
        Err(e) => {
            log_auth_event("password_reset", "-", false, Some(&e.to_string()));
            println!("\n{}", e);
        }
    }
}

fn handle_delete(flow: &mut AuthFlow, store: &mut AccountStore) {
    println!("\n=== Delete account === (leave username empty to go back)");
    let username = match prompt("Username") {
        Ok(input) => input,
        Err(_) => return,
    };
    if username.is_empty() {
        flow.back_to_login();
        return;
    }
    println!("Password:");
    let password = read_password().unwrap_or_default();

    let result = flow.submit_delete(store, &username, &password, || {
        confirm_destructive("ARE YOU SURE? This permanently removes your profile").unwrap_or(false)
    });

    match result {
        Ok(DeleteOutcome::Deleted) => {
            log_auth_event("delete_account", &username, true, None);
            println!("\nYour account has been deleted.");
        }
        Ok(DeleteOutcome::Cancelled) => println!("\nDeletion cancelled."),
        Err(e) => {
            log_auth_event("delete_account", &username, false, Some(&e.to_string()));
            println!("\nCould not delete the account: {}", e);
        }
    }
}
