use async_graphql::{Enum, InputObject, SimpleObject};
use std::cmp::Ordering;

use super::user::{User, UserFilters};

pub const DEFAULT_PAGE_SIZE: i32 = 20;
pub const MAX_PAGE_SIZE: i32 = 100;

/// Which page to return. `offset` is the page size.
#[derive(Debug, Clone, Copy, InputObject)]
#[graphql(name = "PageOptionsInput")]
pub struct PageOptions {
    #[graphql(default = 1)]
    pub page: i32,
    #[graphql(default = 20)]
    pub offset: i32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: 1,
            offset: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageOptions {
    /// Page clamped to at least 1, size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            offset: self.offset.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.offset)
    }

    pub fn skip(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.offset)
    }
}

/// Columns a page can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Enum)]
pub enum SortField {
    Id,
    Name,
    Email,
    Cpf,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Cpf => "cpf",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Ascending comparison of two users on this field.
    pub fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Cpf => a.cpf.cmp(&b.cpf),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Enum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, InputObject)]
#[graphql(name = "OrderByInput")]
pub struct OrderBy {
    #[graphql(default)]
    pub set: SortField,
    #[graphql(default)]
    pub order: SortOrder,
}

impl OrderBy {
    pub fn compare(self, a: &User, b: &User) -> Ordering {
        let ordering = self.set.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Arguments of the `paginatedUsers` query.
#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "FindOptionsInput")]
pub struct FindOptions {
    pub filters: Option<UserFilters>,
    #[graphql(default)]
    pub paginate: PageOptions,
    #[graphql(default)]
    pub order_by: OrderBy,
}

#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct PageInfo {
    pub total_items: i64,
    pub item_count: i64,
    pub total_pages: i64,
    pub page: i32,
    pub next_page: Option<i32>,
    pub prev_page: Option<i32>,
    pub offset: i32,
}

impl PageInfo {
    pub fn new(total_items: i64, item_count: usize, options: PageOptions) -> Self {
        let size = i64::from(options.offset);
        let total_pages = (total_items + size - 1) / size;
        let page = options.page;
        Self {
            total_items,
            item_count: item_count as i64,
            total_pages,
            page,
            next_page: page
                .checked_add(1)
                .filter(|_| i64::from(page) < total_pages),
            prev_page: (page > 1).then_some(page - 1),
            offset: options.offset,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "PaginatedUsers")]
pub struct UserPage {
    pub page_info: PageInfo,
    pub items: Vec<User>,
}
