//! Image carousel picker.
//!
//! Posts reference an image from a fixed bundled set instead of uploading a
//! file. The carousel walks that set with a wrapping cursor.

use crate::models::FileSelection;

/// Path prefix the server resolves bundled images under
const IMAGE_PATH_PREFIX: &str = "images/carousel";

/// Bundled images, in display order.
pub const CAROUSEL_IMAGES: &[&str] = &[
    "alpine-lake.jpg",
    "city-at-night.jpg",
    "coffee-and-notes.jpg",
    "desert-road.jpg",
    "forest-trail.jpg",
    "harbor-morning.jpg",
    "library-stacks.jpg",
    "northern-lights.jpg",
];

fn selection_for(file_name: &str) -> FileSelection {
    FileSelection {
        file_name: file_name.to_string(),
        image_url: format!("{}/{}", IMAGE_PATH_PREFIX, file_name),
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    images: &'static [&'static str],
    index: usize,
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new()
    }
}

impl Carousel {
    pub fn new() -> Self {
        Self {
            images: CAROUSEL_IMAGES,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static str {
        self.images[self.index]
    }

    /// Advance to the next image (wrapping around)
    pub fn next(&mut self) -> &'static str {
        self.index = (self.index + 1) % self.images.len();
        self.current()
    }

    /// Go back to the previous image (wrapping around)
    pub fn previous(&mut self) -> &'static str {
        self.index = (self.index + self.images.len() - 1) % self.images.len();
        self.current()
    }

    /// Choose the current image.
    pub fn select(&self) -> FileSelection {
        selection_for(self.current())
    }

    /// Look up a bundled image by file name (case-insensitive).
    pub fn find(file_name: &str) -> Option<FileSelection> {
        CAROUSEL_IMAGES
            .iter()
            .find(|name| name.eq_ignore_ascii_case(file_name.trim()))
            .map(|name| selection_for(name))
    }

    /// All bundled images as selections, for listing.
    pub fn all() -> Vec<FileSelection> {
        CAROUSEL_IMAGES.iter().map(|name| selection_for(name)).collect()
    }
}
