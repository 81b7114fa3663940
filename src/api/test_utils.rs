use crate::api::state::AppState;
use crate::store::NoteStore;

pub fn setup_test_state() -> AppState {
    AppState::new(NoteStore::seeded())
}
