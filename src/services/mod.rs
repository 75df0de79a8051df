//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni modulo gestisce gli endpoint HTTP di una risorsa; le funzioni
//! `pub(crate)` sono helper condivisi fra moduli (profili, visibilità,
//! notifiche).

pub mod alert;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod classe;
pub mod conversation;
pub mod grade;
pub mod message;
pub mod notification;
pub mod session;
pub mod statistics;
pub mod student;
pub mod timetable;
pub mod user;

// Re-exports per facilitare l'import
pub use alert::{create_alert, list_alerts};
pub use attendance::list_attendance;
pub use auth::{change_password, get_me, login_user};
pub use calendar::{create_event, delete_event, list_events, update_event};
pub use classe::{
    create_classe, delete_classe, get_classe, list_classe_students, list_classes, update_classe,
};
pub use conversation::{
    add_participant, create_conversation, get_conversation, leave_conversation,
    list_conversations,
};
pub use grade::{create_grade, delete_grade, list_grades, update_grade};
pub use message::{delete_message, list_messages, send_message};
pub use notification::{
    delete_notification, list_notifications, mark_all_read, mark_notification_read, unread_count,
};
pub use session::{
    create_session, delete_session, get_session, get_session_attendance, list_sessions,
    record_attendance, update_session,
};
pub use statistics::{get_classe_stats, get_overview};
pub use student::{
    assign_classe, assign_parent, get_student, get_student_attendance, get_student_grades,
    list_students,
};
pub use timetable::{create_timetable, delete_timetable, list_timetables, update_timetable};
pub use user::{create_user, delete_user, get_user, list_users, update_user};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
