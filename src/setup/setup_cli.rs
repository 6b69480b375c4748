use bcrypt::{hash, DEFAULT_COST};
use chemwire_backend::config::Config;
use chemwire_backend::models::Role;
use chemwire_backend::setup::db_setup;
use clap::{Parser, Subcommand};
use redb::Database;
use rusqlite::{params, Connection};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    Setup { db_type: Option<String> },
}

#[derive(Subcommand, Debug)]
enum AccountAction {
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// "admin" or "moderator".
        #[arg(long, default_value = "admin")]
        role: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        new_password: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup { db_type } => match db_type.as_deref() {
                Some("accounts") => setup_accounts_database(&config),
                Some("content") => setup_content_database(&config),
                Some(other) => eprintln!(
                    "❌ Error: Unknown database type '{}'. Use 'accounts' or 'content'.",
                    other
                ),
                None => {
                    setup_accounts_database(&config);
                    setup_content_database(&config);
                }
            },
        },
        Commands::Account { action } => match action {
            AccountAction::Create { username, email, password, role } => {
                create_staff_account(&config, username, email, password, role);
            }
            AccountAction::List => {
                list_staff_accounts(&config);
            }
            AccountAction::ChangePassword { username, new_password } => {
                change_account_password(&config, username, new_password);
            }
        },
    }
}

fn setup_accounts_database(config: &Config) {
    let db_path = config.accounts_db_path();
    if db_path.exists() {
        println!(
            "ℹ️ Accounts database already exists at '{}'. Skipping creation.",
            db_path.display()
        );
        return;
    }
    println!("\nSetting up accounts database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create accounts database file.");
    match db_setup::setup_accounts_db(&mut conn) {
        Ok(_) => println!("✅ Accounts database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up accounts database: {}", e),
    }
}

fn setup_content_database(config: &Config) {
    let db_path = config.content_db_path();
    if db_path.exists() {
        println!(
            "ℹ️ Content database already exists at '{}'. Skipping creation.",
            db_path.display()
        );
        return;
    }
    println!("\nSetting up content database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let db = Database::create(&db_path).expect("Failed to create content database file.");
    match db_setup::setup_content_db(&db) {
        Ok(_) => println!("✅ Content database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up content database: {}", e),
    }
}

fn create_staff_account(config: &Config, username: &str, email: &str, password: &str, role: &str) {
    let role = match Role::parse(role) {
        Some(role) => role,
        None => {
            eprintln!("❌ Error: Unknown role '{}'. Use 'admin' or 'moderator'.", role);
            return;
        }
    };
    let db_path = config.accounts_db_path();
    if !db_path.exists() {
        eprintln!(
            "❌ Error: Accounts database not found at '{}'. Please run `setup_cli db setup` first.",
            db_path.display()
        );
        return;
    }
    let conn = Connection::open(&db_path).expect("Could not open accounts database.");
    let hashed_password = hash(password, DEFAULT_COST).expect("Failed to hash password");

    match conn.execute(
        "INSERT INTO accounts (username, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
        params![username, email.trim().to_lowercase(), hashed_password, role.as_str()],
    ) {
        Ok(_) => println!("✅ Account '{}' created successfully.", username),
        Err(e) => eprintln!(
            "❌ Error creating account: {}. The username or email might already exist.",
            e
        ),
    }
}

fn list_staff_accounts(config: &Config) {
    let conn = match Connection::open(config.accounts_db_path()) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("❌ Error: Accounts database not found. Please run `setup_cli db setup` first.");
            return;
        }
    };
    let mut stmt = match conn.prepare("SELECT username, role FROM accounts ORDER BY username") {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Error preparing database query: {}", e);
            return;
        }
    };
    let account_iter = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    });

    println!("Listing staff accounts:");
    match account_iter {
        Ok(accounts) => {
            for account in accounts {
                match account {
                    Ok((username, role)) => println!("- {} ({})", username, role),
                    Err(_) => println!("- Invalid account row"),
                }
            }
        }
        Err(e) => eprintln!("❌ Error fetching accounts: {}", e),
    }
}

fn change_account_password(config: &Config, username: &str, new_password: &str) {
    let conn = match Connection::open(config.accounts_db_path()) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("❌ Error: Accounts database not found.");
            return;
        }
    };
    let hashed_password = hash(new_password, DEFAULT_COST).expect("Failed to hash new password");
    match conn.execute(
        "UPDATE accounts SET password_hash = ?1 WHERE username = ?2",
        params![hashed_password, username],
    ) {
        Ok(0) => eprintln!("❌ Error: No account named '{}' found.", username),
        Ok(_) => println!("✅ Password for account '{}' changed successfully.", username),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}
