use outreach_types::api::{Page, PageItem};

pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 200;

/// Pages shown in the pagination bar.
///
/// Up to seven pages are all listed. Beyond that: first page, a window of
/// three around `current`, last page, with gaps where pages are skipped.
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }
    if total_pages <= 7 {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let (start, end) = if current <= 3 {
        (2, 4.min(total_pages - 1))
    } else if current >= total_pages - 2 {
        ((total_pages - 3).max(2), total_pages - 1)
    } else {
        (current - 1, current + 1)
    };

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total_pages - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));
    items
}

/// Slice one page out of `items`. Out-of-range pages are clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let from = ((page - 1) * per_page).min(total_items);
    let to = (from + per_page).min(total_items);

    Page {
        items: items[from..to].to_vec(),
        page,
        per_page,
        total_items,
        total_pages,
        window: page_window(page, total_pages),
    }
}
