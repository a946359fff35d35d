use wizard::Navigator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) navigator: Navigator,
}
