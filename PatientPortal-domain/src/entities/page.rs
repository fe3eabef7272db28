use serde::Serialize;

/// One page of a list, in the `{items, total, page, size, pages}` shape of the portal API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
    /// 1-based page number
    pub page: usize,
    /// Requested page size
    pub size: usize,
    /// Number of pages
    pub pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slice `all` into the requested page. Page numbers below 1 are treated as 1.
    pub fn from_slice(all: &[T], page: usize, size: usize) -> Self {
        let page = page.max(1);
        let total = all.len();
        if size == 0 {
            return Self {
                items: Vec::new(),
                total,
                page,
                size,
                pages: 0,
            };
        }

        let pages = total.div_ceil(size);
        let items = all
            .iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .cloned()
            .collect();

        Self {
            items,
            total,
            page,
            size,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_and_last_pages() {
        let all: Vec<u32> = (1..=7).collect();

        let second = Page::from_slice(&all, 2, 3);
        assert_eq!(second.items, vec![4, 5, 6]);
        assert_eq!(second.pages, 3);
        assert_eq!(second.total, 7);

        let last = Page::from_slice(&all, 3, 3);
        assert_eq!(last.items, vec![7]);
    }

    #[test]
    fn test_out_of_range_and_zero_size() {
        let all = vec!["a", "b"];
        assert!(Page::from_slice(&all, 5, 2).items.is_empty());

        let empty = Page::from_slice(&all, 1, 0);
        assert!(empty.items.is_empty());
        assert_eq!(empty.pages, 0);

        assert_eq!(Page::from_slice(&all, 0, 1).page, 1);

        let huge = Page::from_slice(&all, 1, usize::MAX);
        assert_eq!(huge.items, vec!["a", "b"]);
        assert_eq!(huge.pages, 1);
        assert!(Page::from_slice(&all, 2, usize::MAX).items.is_empty());
    }
}
