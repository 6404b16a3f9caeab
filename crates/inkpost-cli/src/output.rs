//! Plain-text rendering of hook views.

use chrono::Utc;

use inkpost_core::hooks::{PostDetailView, PostsListView, UserDetailsView};
use inkpost_core::models::Post;
use inkpost_core::utils::{excerpt, format_date, format_remaining, truncate_string};
use inkpost_core::Session;

const TITLE_WIDTH: usize = 40;
const EXCERPT_WIDTH: usize = 72;

/// "expires in 1h 5m" or "expired"
pub fn expiry_label(session: &Session) -> String {
    match session.expires_at() {
        Some(at) => match format_remaining(at - Utc::now()).as_str() {
            "expired" => "expired".to_string(),
            remaining => format!("expires in {}", remaining),
        },
        None => "no expiry".to_string(),
    }
}

pub fn status(environment: &str, endpoint: &str, session: &Session) -> String {
    let mut lines = vec![
        format!("Environment: {}", environment),
        format!("Endpoint:    {}", endpoint),
    ];
    if session.user_authenticated {
        lines.push(format!("Signed in:   yes (user {})", session.user_id));
        lines.push(format!("Session:     {}", expiry_label(session)));
    } else {
        lines.push("Signed in:   no".to_string());
    }
    lines.join("\n")
}

pub fn profile(view: &UserDetailsView) -> String {
    let Some(user) = &view.user else {
        return "No profile".to_string();
    };
    let mut lines = vec![
        format!("{} <{}>", user.name, user.email),
        format!("Status:  {}", user.status_display()),
        format!("Posts:   {}", user.post_count()),
    ];
    if let Some(created) = &view.session_created {
        lines.push(format!("Session: started {}", format_date(created)));
    }
    if let Some(expires) = &view.session_expires {
        lines.push(format!("         expires {}", format_date(expires)));
    }
    lines.join("\n")
}

fn post_line(post: &Post, viewer: &str) -> String {
    let owner = if post.is_owned_by(viewer) { "*" } else { " " };
    format!(
        "{} {:<24} {:<width$} {}\n    {}",
        owner,
        post.id,
        truncate_string(&post.title, TITLE_WIDTH),
        post.created_display(),
        excerpt(&post.content, EXCERPT_WIDTH),
        width = TITLE_WIDTH
    )
}

/// The feed, one post per entry; posts the viewer wrote are starred.
pub fn posts_page(view: &PostsListView, viewer: &str) -> String {
    if view.posts.is_empty() {
        return format!("No posts. {}", view.pagination.label());
    }

    let mut lines: Vec<String> = view.posts.iter().map(|post| post_line(post, viewer)).collect();
    lines.push(String::new());

    let mut footer = view.pagination.label();
    if let Some(next) = view.pagination.next() {
        footer.push_str(&format!(" (next: --page {})", next));
    }
    lines.push(footer);
    lines.join("\n")
}

pub fn post_detail(view: &PostDetailView, viewer: &str) -> String {
    let Some(post) = &view.post else {
        return "Post unavailable".to_string();
    };

    let mut header = format!("{} by {}", post.title, post.creator.name);
    if !post.created_display().is_empty() {
        header.push_str(&format!(", {}", post.created_display()));
    }
    if post.was_edited() {
        header.push_str(" (edited)");
    }

    let mut lines = vec![header, format!("id: {}", post.id)];
    if let Some(image) = &post.image_url {
        lines.push(format!("image: {}", image));
    }
    if post.is_owned_by(viewer) {
        lines.push("you can edit or delete this post".to_string());
    }
    lines.push(String::new());
    lines.push(post.content.clone());
    lines.join("\n")
}
