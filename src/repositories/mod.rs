//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository possiede un clone del pool e gestisce le operazioni di
//! database di una tabella (o, per `DirectoryRepository`, delle quattro
//! tabelle utente viste come una sola).

// ************************* NOTA SU SQLX ************************* //

/*
   Le query sono scritte con `sqlx::query_as::<_, T>(...)` + `FromRow` e non con le macro
   `query!`/`query_as!`: le macro vogliono un database raggiungibile (o la cache offline)
   in compilazione, mentre così il crate compila ovunque e i test girano su SQLite in memoria
   con `#[sqlx::test]`.
   Regole della casa:
   - INSERT/UPDATE usano `RETURNING` e restituiscono la riga completa
   - update e delete su un id inesistente restituiscono `sqlx::Error::RowNotFound` (-> 404)
   - i filtri opzionali si compongono con `QueryBuilder` e `push_bind`, mai concatenando valori
   - le coppie `(<prefix>_id, <prefix>_type)` si scrivono sempre da un `UserRef`
*/

pub type PoolType = sqlx::SqlitePool;

/// Pattern `LIKE` che trova `search` come sottostringa letterale.
/// Va usato con `ESCAPE '\'`: `%`, `_` e `\` nel testo non fanno da jolly.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ************************* MODULI REPOSITORY ************************* //

pub mod account;
pub mod alert;
pub mod attendance;
pub mod calendar;
pub mod classe;
pub mod conversation;
pub mod directory;
pub mod grade;
pub mod message;
pub mod notification;
pub mod session;
pub mod statistics;
pub mod timetable;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Paginate, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use account::{AdministratorRepository, ParentRepository, StudentRepository, TeacherRepository};
pub use alert::AlertRepository;
pub use attendance::AttendanceRepository;
pub use calendar::CalendarRepository;
pub use classe::ClasseRepository;
pub use conversation::ConversationRepository;
pub use directory::DirectoryRepository;
pub use grade::GradeRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use session::SessionRepository;
pub use statistics::StatisticsRepository;
pub use timetable::TimetableRepository;
