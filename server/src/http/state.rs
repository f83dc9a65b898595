use crate::templates::Templates;

pub struct AppState {
    pub templates: Templates,
}
