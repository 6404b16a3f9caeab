//! Command handlers.
//!
//! `App` owns the configuration, the session and the API client for one
//! invocation. Each handler drives the core hooks and prints their views.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use inkpost_core::auth::flows::{self, LoginError};
use inkpost_core::auth::RememberedLogin;
use inkpost_core::carousel::{Carousel, CAROUSEL_IMAGES};
use inkpost_core::hooks::{
    self, PostDetailHook, PostFormHook, PostTarget, PostsListHook, UserDetailsHook,
};
use inkpost_core::models::{FileSelection, ImageChoice, PostForm, SignupForm};
use inkpost_core::utils::looks_like_email;
use inkpost_core::{ApiClient, AuthContext, AuthState, Config, FileStore, Session};

use crate::output;

/// How many posts `posts show` fetches at once
const MAX_CONCURRENT_FETCHES: usize = 4;

pub struct App {
    config: Config,
    auth: AuthContext<FileStore>,
    api: ApiClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let auth = open_session(config.cache_dir())?;
        let api = ApiClient::from_config(&config).context("Failed to create API client")?;

        Ok(Self { config, auth, api })
    }

    /// The current session, or an error telling the user to sign in.
    fn require_session(&self) -> Result<Session> {
        let session = self.auth.session();
        if session.bearer().is_none() || session.user_id().is_none() {
            bail!("Not signed in. Run `inkpost login` first.");
        }
        Ok(session)
    }

    // =========================================================================
    // Account
    // =========================================================================

    pub async fn signup(&mut self, name: Option<String>, email: Option<String>) -> Result<()> {
        let name = match name {
            Some(name) => name,
            None => prompt("Name: ")?,
        };
        let email = match email {
            Some(email) => email,
            None => prompt("Email: ")?,
        };
        if !looks_like_email(&email) {
            warn!(email = %email, "Email looks malformed, letting the server decide");
        }
        let password = rpassword::prompt_password("Password: ")?;
        let confirm_password = rpassword::prompt_password("Confirm password: ")?;

        let form = SignupForm {
            name,
            email: email.trim().to_string(),
            password,
            confirm_password,
        };
        let result = flows::signup(&self.api, &form).await?;

        if !result.success {
            for message in result.field_errors() {
                println!("  - {}", message);
            }
            bail!("Signup rejected");
        }

        self.config.last_email = Some(form.email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        println!("Account created. Sign in with `inkpost login`.");
        Ok(())
    }

    pub async fn login(&mut self, email: Option<String>, remember: bool) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => prompt("Email: ")?,
        };

        let keychain = RememberedLogin::for_email(&email);
        let remembered = if remember { None } else { keychain.password() };
        let from_keychain = remembered.is_some();
        let password = match remembered {
            Some(password) => {
                debug!("Using password from keychain");
                password
            }
            None => rpassword::prompt_password(format!("Password for {}: ", email))?,
        };

        let state = match flows::login(&self.api, &mut self.auth, &email, &password).await {
            Ok(state) => state,
            Err(e) => {
                if should_forget_password(from_keychain, &e) {
                    if let Err(forget_err) = keychain.forget() {
                        warn!(error = %forget_err, "Failed to forget stale keychain password");
                    }
                    println!("The remembered password was removed; run login again.");
                }
                return Err(e.into());
            }
        };
        if state != AuthState::Authenticated {
            bail!("The server issued a session that has already expired");
        }

        if remember {
            if let Err(e) = keychain.remember(&password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }
        self.config.last_email = Some(email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        let session = self.auth.session();
        println!("Signed in as {} ({})", email, output::expiry_label(&session));
        Ok(())
    }

    pub async fn logout(&mut self, forget: bool) -> Result<()> {
        flows::logout(&self.api, &mut self.auth).await;

        if forget {
            if let Some(email) = self.config.last_email.as_deref() {
                if RememberedLogin::for_email(email).forget()? {
                    info!("Forgot remembered password");
                }
            }
        }
        println!("Signed out.");
        Ok(())
    }

    pub fn status(&self) {
        println!(
            "{}",
            output::status(
                &self.config.environment.to_string(),
                self.config.base_url(),
                &self.auth.session(),
            )
        );
    }

    pub async fn whoami(&self) -> Result<()> {
        let session = self.require_session()?;
        let mut hook = UserDetailsHook::new();
        hook.run(&session, &self.api).await;

        if let Some(failure) = hook.state().failure() {
            bail!("{}", failure.message());
        }
        println!("{}", output::profile(&hook.view()));

        if let Some(failure) = hook.confirmation().failure() {
            eprintln!("Warning: session could not be confirmed ({})", failure.message());
        }
        Ok(())
    }

    // =========================================================================
    // Posts
    // =========================================================================

    pub async fn list_posts(&self, page: u32) -> Result<()> {
        let session = self.require_session()?;
        let mut hook = PostsListHook::new(page);
        hook.activate(&session, &self.api).await;

        if let Some(failure) = hook.state().failure() {
            bail!("{}", failure.message());
        }
        println!("{}", output::posts_page(&hook.view(), &session.user_id));
        Ok(())
    }

    /// Fetch several posts concurrently, one hook per post, and print them
    /// in the order they were asked for.
    pub async fn show_posts(&self, post_ids: &[String]) -> Result<()> {
        let session = self.require_session()?;
        let api = &self.api;
        let session_ref = &session;

        let mut results: Vec<(usize, PostDetailHook)> = stream::iter(post_ids.iter().enumerate())
            .map(|(index, post_id)| async move {
                let mut hook = PostDetailHook::new(PostTarget::new(&session_ref.user_id, post_id));
                hook.activate(session_ref, api).await;
                (index, hook)
            })
            .buffer_unordered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);

        let mut failed = 0;
        for (_, hook) in &results {
            match hook.state().failure() {
                Some(failure) => {
                    failed += 1;
                    eprintln!("{}: {}", hook.target().post_id, failure.message());
                }
                None => println!("{}", output::post_detail(&hook.view(), &session.user_id)),
            }
        }

        if failed == results.len() {
            bail!("No posts could be shown");
        }
        Ok(())
    }

    pub async fn create_post(&self, title: String, content: String, image: &str) -> Result<()> {
        let session = self.require_session()?;
        let form = PostForm {
            title,
            content,
            image: ImageChoice::Carousel(resolve_image(image)?),
        };

        let mut hook = PostFormHook::create();
        hook.submit(&session, &self.api, &form).await;
        report_submission(&hook, "Created")
    }

    pub async fn edit_post(
        &mut self,
        post_id: &str,
        title: Option<String>,
        content: Option<String>,
        image: Option<&str>,
    ) -> Result<()> {
        let session = self.require_session()?;

        let mut detail = PostDetailHook::new(PostTarget::new(&session.user_id, post_id));
        detail.activate(&session, &self.api).await;
        let current = match detail.state().value() {
            Some((_, post)) => post.clone(),
            None => {
                let message = detail
                    .state()
                    .failure()
                    .map(|f| f.message())
                    .unwrap_or_else(|| "Post unavailable".to_string());
                bail!("{}", message);
            }
        };

        let form = PostForm {
            title: title.unwrap_or(current.title),
            content: content.unwrap_or(current.content),
            image: match image {
                Some(name) => ImageChoice::Carousel(resolve_image(name)?),
                None => ImageChoice::Keep,
            },
        };

        let mut hook = PostFormHook::edit(post_id);
        hook.submit(&session, &self.api, &form).await;
        report_submission(&hook, "Updated")
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let session = self.require_session()?;
        hooks::delete_post(&session, &self.api, post_id)
            .await
            .map_err(|failure| anyhow!("{}", failure.message()))?;
        println!("Deleted {}", post_id);
        Ok(())
    }
}

/// Load the stored session from the per-environment cache directory.
fn open_session(cache_dir: Result<PathBuf>) -> Result<AuthContext<FileStore>> {
    let cache_dir = cache_dir.context("No cache directory to keep the session in")?;
    debug!(?cache_dir, "Cache directory configured");

    let mut auth = AuthContext::new(FileStore::new(&cache_dir));
    let state = auth.validate_authentication();
    debug!(?state, "Session loaded");
    Ok(auth)
}

/// A remembered password is only dropped when the server refused it, not
/// when the request never got an answer.
fn should_forget_password(from_keychain: bool, err: &LoginError) -> bool {
    from_keychain && err.is_rejected()
}

pub fn print_images() {
    for selection in Carousel::all() {
        println!("{:<24} {}", selection.file_name, selection.image_url);
    }
}

fn resolve_image(name: &str) -> Result<FileSelection> {
    Carousel::find(name).ok_or_else(|| {
        anyhow!(
            "Unknown image '{}'. Available: {}",
            name,
            CAROUSEL_IMAGES.join(", ")
        )
    })
}

fn report_submission(hook: &PostFormHook, verb: &str) -> Result<()> {
    let view = hook.view();
    if let Some(post) = view.post {
        println!("{} post {} \"{}\"", verb, post.id, post.title);
        return Ok(());
    }

    for message in view.validation.field_errors() {
        println!("  - {}", message);
    }
    match hook.state().failure() {
        Some(failure) => bail!("{}", failure.message()),
        None => bail!("Not signed in. Run `inkpost login` first."),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
