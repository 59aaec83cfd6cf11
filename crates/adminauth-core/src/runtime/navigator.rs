/// Client-side router abstraction
pub trait Navigator: Send + Sync {
    /// Path of the view currently shown
    fn current_path(&self) -> String;

    /// Move to `path`; `replace` overwrites the current history entry
    fn navigate(&self, path: &str, replace: bool);
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn navigate(&self, path: &str, replace: bool) {
        (**self).navigate(path, replace)
    }
}
