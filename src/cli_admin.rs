//! Maintenance CLI for the catalog and user databases.
//!
//! Catalog mutations are deliberately kept off the HTTP surface; this
//! binary is how an operator manages movies and accounts.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, str::FromStr, sync::Arc};

use filmlog_server::catalog::{CatalogStore, Movie, Review, SqliteCatalogStore};
use filmlog_server::user::auth::PasswordCredentials;
use filmlog_server::user::{SqliteUserStore, UserRole, UserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser)]
struct CliArgs {
    /// Path to the SQLite movie catalog database file.
    #[clap(value_parser = parse_path)]
    pub catalog_db: PathBuf,

    /// Path to the SQLite user database file.
    #[clap(value_parser = parse_path)]
    pub user_db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates a user with the given email and full name.
    AddUser {
        email: String,
        full_name: String,
        password: String,
        /// Create the user with the admin role.
        #[clap(long)]
        admin: bool,
    },

    /// Replaces the password of an existing user.
    SetPassword { email: String, password: String },

    /// Changes the role of an existing user (regular or admin).
    SetRole { email: String, role: String },

    /// Shows all users.
    ListUsers,

    /// Adds a movie to the catalog.
    AddMovie {
        id: String,
        name: String,
        genre: String,
        release_year: u16,
        /// Poster file name under the poster directory.
        #[clap(long)]
        poster: Option<String>,
    },

    /// Deletes a movie and its reviews.
    RemoveMovie { id: String },

    /// Shows all movies with their average ratings.
    ListMovies,

    /// Appends a review to a movie.
    AddReview {
        movie_id: String,
        user_email: String,
        /// 1 to 5.
        rating: u8,
        #[clap(long)]
        comment: Option<String>,
        #[clap(long)]
        emotion_tag: Option<String>,
    },
}

fn find_user(user_store: &SqliteUserStore, email: &str) -> Result<filmlog_server::user::User> {
    user_store
        .get_user_by_email(email)?
        .with_context(|| format!("No user with email {}", email))
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let catalog_store = Arc::new(SqliteCatalogStore::new(&cli_args.catalog_db)?);
    let user_store = Arc::new(SqliteUserStore::new(&cli_args.user_db)?);

    match cli_args.command {
        Command::AddUser {
            email,
            full_name,
            password,
            admin,
        } => {
            let role = if admin {
                UserRole::Admin
            } else {
                UserRole::Regular
            };
            let user_id = user_store.create_user(&email, &full_name, role)?;
            user_store.set_password_credentials(PasswordCredentials::create(user_id, &password)?)?;
            println!("Created user {} with id {}", email, user_id);
        }
        Command::SetPassword { email, password } => {
            let user = find_user(&user_store, &email)?;
            user_store.set_password_credentials(PasswordCredentials::create(user.id, &password)?)?;
            println!("Updated password of {}", email);
        }
        Command::SetRole { email, role } => {
            let role = UserRole::from_str(&role)?;
            let user = find_user(&user_store, &email)?;
            user_store.set_user_role(user.id, role)?;
            println!("Set role of {} to {}", email, role.as_str());
        }
        Command::ListUsers => {
            for user in user_store.get_all_users()? {
                println!(
                    "{:>5}  {:<30}  {:<10}  {}",
                    user.id,
                    user.email,
                    user.role.as_str(),
                    user.full_name
                );
            }
        }
        Command::AddMovie {
            id,
            name,
            genre,
            release_year,
            poster,
        } => {
            catalog_store.add_movie(&Movie {
                id: id.clone(),
                name,
                genre,
                release_year,
                poster,
                reviews: vec![],
            })?;
            println!("Added movie {}", id);
        }
        Command::RemoveMovie { id } => {
            if catalog_store.remove_movie(&id)? {
                println!("Removed movie {}", id);
            } else {
                bail!("No movie with id {}", id);
            }
        }
        Command::ListMovies => {
            for movie in catalog_store.list_movies(&Default::default())? {
                let rating = movie
                    .average_rating()
                    .map(|r| format!("{:.1}", r))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<20}  {:<30}  {:<12}  {}  ({} reviews, avg {})",
                    movie.id,
                    movie.name,
                    movie.genre,
                    movie.release_year,
                    movie.reviews.len(),
                    rating
                );
            }
        }
        Command::AddReview {
            movie_id,
            user_email,
            rating,
            comment,
            emotion_tag,
        } => {
            if !(1..=5).contains(&rating) {
                bail!("Rating must be between 1 and 5");
            }
            let added = catalog_store.add_review(
                &movie_id,
                &Review {
                    user_email,
                    rating,
                    comment,
                    emotion_tag,
                    created_at: chrono::Utc::now().timestamp(),
                },
            )?;
            if !added {
                bail!("No movie with id {}", movie_id);
            }
            println!("Added review to {}", movie_id);
        }
    }

    Ok(())
}
