//! Query parameters shared by both repository backends.

use std::str::FromStr;

use serde::Serialize;

use crate::errors::AppError;

/// A sortable user attribute. Each variant maps to a fixed column so no
/// caller-supplied text ever reaches an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Id,
    Username,
    Email,
    FullName,
    IsActive,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::FullName => "full_name",
            SortField::IsActive => "is_active",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    /// Accepts the JSON attribute name (`createdAt`) or the column name (`created_at`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "username" => Ok(SortField::Username),
            "email" => Ok(SortField::Email),
            "fullName" | "full_name" => Ok(SortField::FullName),
            "isActive" | "is_active" => Ok(SortField::IsActive),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(AppError::Validation(format!(
                "Unknown sort field '{other}'"
            ))),
        }
    }
}

/// Optional filters for the advanced search. Present filters are ANDed;
/// string filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

impl UserSearch {
    /// Blank string filters are treated as absent.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        UserSearch {
            username: clean(self.username),
            email: clean(self.email),
            full_name: clean(self.full_name),
            is_active: self.is_active,
        }
    }
}

/// Wraps `fragment` as a `LIKE` pattern matching it anywhere in the value.
/// `%`, `_` and `\` inside the fragment match literally.
pub fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
