//! Query DTOs - Parametri di query per filtri e paginazione

use crate::entities::{AttendanceStatus, SessionKind, UserKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagina e dimensione già normalizzate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// `page` parte da 1, `limit` è limitato a 1..=MAX_PAGE_SIZE
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Risposta paginata: `{data, total, page, limit, pages}`
#[derive(Serialize, Deserialize, Debug)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let limit = pagination.limit as i64;
        Self {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
            pages: (total + limit - 1) / limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// /api/users?type=teacher&search=dup
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UserListQuery {
    #[serde(rename = "type")]
    pub kind: Option<UserKind>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StudentListQuery {
    pub classe_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ClasseListQuery {
    pub search: Option<String>,
    pub level: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TimetableQuery {
    pub classe_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub day_of_week: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SessionQuery {
    pub classe_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub kind: Option<SessionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct GradeQuery {
    pub student_id: Option<i32>,
    pub classe_id: Option<i32>,
    pub subject: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct AttendanceQuery {
    pub student_id: Option<i32>,
    pub session_id: Option<i32>,
    pub status: Option<AttendanceStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CalendarQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub classe_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct NotificationQuery {
    pub unread: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesQuery {
    pub conversation_id: i32,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
