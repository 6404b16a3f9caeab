//! Data models for inkpost entities.
//!
//! - `User`, `UserDetails`: the signed-in author and their session metadata
//! - `Post`, `PostForm`, `PostValidation`: posts and the create/edit form
//! - `FileSelection`: an image picked from the carousel
//! - `Pagination`: page math for post listings
//! - `LoginResult`, `SignupForm`, `SignupResult`: account flows

pub mod account;
pub mod pagination;
pub mod post;
pub mod user;

pub use account::{LoginResult, SignupForm, SignupResult};
pub use pagination::{Pagination, PostsPage};
pub use post::{FileSelection, ImageChoice, Post, PostCreator, PostForm, PostValidation};
pub use user::{User, UserDetails};
