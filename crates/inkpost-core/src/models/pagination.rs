use super::Post;

/// Page math behind the post list pager. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    /// At least one page, even when there are no posts.
    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn previous(&self) -> Option<u32> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    /// "Page 2 of 5"
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }
}

/// One page of the post list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 5, 0).total_pages(), 1);
        assert_eq!(Pagination::new(1, 5, 5).total_pages(), 1);
        assert_eq!(Pagination::new(1, 5, 6).total_pages(), 2);
        assert_eq!(Pagination::new(1, 5, 11).total_pages(), 3);
    }

    #[test]
    fn test_navigation_bounds() {
        let first = Pagination::new(1, 5, 11);
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(2));

        let last = Pagination::new(3, 5, 11);
        assert_eq!(last.previous(), Some(2));
        assert_eq!(last.next(), None);
        assert_eq!(last.label(), "Page 3 of 3");
    }

    #[test]
    fn test_zero_inputs_are_clamped() {
        let p = Pagination::new(0, 0, 3);
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
        assert_eq!(p.total_pages(), 3);
    }
}
