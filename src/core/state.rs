//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository e la configurazione condivisa
//! necessari per gestire le richieste.

use crate::repositories::{
    AdministratorRepository, AlertRepository, AttendanceRepository, CalendarRepository,
    ClasseRepository, ConversationRepository, DirectoryRepository, GradeRepository,
    MessageRepository, NotificationRepository, ParentRepository, PoolType, SessionRepository,
    StatisticsRepository, StudentRepository, TeacherRepository, TimetableRepository,
};

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Una repository per ciascuna tabella utente
    pub administrator: AdministratorRepository,
    pub teacher: TeacherRepository,
    pub student: StudentRepository,
    pub parent: ParentRepository,

    /// Risoluzione dei riferimenti polimorfici `(id, tipo)`
    pub directory: DirectoryRepository,

    pub classe: ClasseRepository,
    pub timetable: TimetableRepository,
    pub session: SessionRepository,
    pub attendance: AttendanceRepository,
    pub grade: GradeRepository,
    pub calendar: CalendarRepository,

    pub conversation: ConversationRepository,
    pub msg: MessageRepository,
    pub notification: NotificationRepository,
    pub alert: AlertRepository,

    pub statistics: StatisticsRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni SQLite condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(pool: PoolType, jwt_secret: String) -> Self {
        Self {
            administrator: AdministratorRepository::new(pool.clone()),
            teacher: TeacherRepository::new(pool.clone()),
            student: StudentRepository::new(pool.clone()),
            parent: ParentRepository::new(pool.clone()),
            directory: DirectoryRepository::new(pool.clone()),
            classe: ClasseRepository::new(pool.clone()),
            timetable: TimetableRepository::new(pool.clone()),
            session: SessionRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            grade: GradeRepository::new(pool.clone()),
            calendar: CalendarRepository::new(pool.clone()),
            conversation: ConversationRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool.clone()),
            alert: AlertRepository::new(pool.clone()),
            statistics: StatisticsRepository::new(pool),
            jwt_secret,
        }
    }
}
