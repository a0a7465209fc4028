use admitdesk_auth::hash_password;
use admitdesk_cli::report::{render_check, render_matrix, render_role_table};
use admitdesk_rbac::{
    Action, AssignedRole, FEATURE_MIN_ROLE, Feature, Role, validate_min_role_table,
};
use clap::{Parser, Subcommand};
use dialoguer::Password;

#[derive(Parser)]
#[command(name = "admitdesk-cli")]
#[command(about = "Admitdesk CLI - Permission tables and local account tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the permission table for one role, or for every role
    Matrix {
        /// sales, manager, chief or admin
        #[arg(short = 'r', long)]
        role: Option<Role>,
    },
    /// Show both access decisions for a role, feature and action
    Check {
        /// Role name; unrecognized names are accepted
        #[arg(short = 'r', long)]
        role: String,

        #[arg(short = 'f', long)]
        feature: Feature,

        /// can_view, can_edit, can_delete (or view, edit, delete)
        #[arg(short = 'a', long)]
        action: Action,
    },
    /// Verify that every feature has exactly one minimum role
    Validate,
    /// Print a bcrypt hash for LOCAL_ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Matrix { role } => match role {
            Some(role) => print!("{}", render_role_table(role)),
            None => print!("{}", render_matrix()),
        },
        Commands::Check {
            role,
            feature,
            action,
        } => print!("{}", render_check(&AssignedRole::parse(&role), feature, action)),
        Commands::Validate => handle_validate(),
        Commands::HashPassword { password } => handle_hash_password(password),
    }
}

fn handle_validate() {
    match validate_min_role_table(FEATURE_MIN_ROLE) {
        Ok(()) => println!("✅ Minimum-role table covers all {} features", Feature::ALL.len()),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_hash_password(password: Option<String>) {
    let password = match password {
        Some(password) => password,
        None => match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(password) => password,
            Err(e) => {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            }
        },
    };

    match hash_password(&password) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("❌ Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
