use crate::{db::DbPool, services::trips::TripService};

#[derive(Clone)]
pub struct AppState {
    pub trips: TripService,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self {
            trips: TripService::new(db),
        }
    }
}
